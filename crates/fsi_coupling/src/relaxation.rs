// crates/fsi_coupling/src/relaxation.rs

//! 外迭代松弛策略
//!
//! 每个策略根据当前残差给出松弛因子 f，耦合层按
//! `next = prev + f · r` 更新位移估计。
//!
//! | 策略 | 因子 | 外迭代上限 |
//! |------|------|------------|
//! | [`WeakCoupling`] | 1 | 1（无外迭代修正） |
//! | [`FixedRelaxation`] | 常数 | 配置值 |
//! | [`AitkenRelaxation`] | 向量 Aitken Δ² 自适应 | 配置值 |
//!
//! 多个界面对时每个界面对各自维护因子与残差历史。

use log::debug;

use fsi_config::{AitkenSeed, CouplingConfig, CouplingScheme};
use fsi_foundation::{SMALL, VSMALL};
use fsi_mesh::DVec3;

use crate::residual::{dot, norm_squared};

/// 松弛策略
pub trait RelaxationStrategy: Send {
    /// 策略标签
    fn scheme(&self) -> CouplingScheme;

    /// 每个时间步的外迭代上限
    fn max_outer_iterations(&self, configured: usize) -> usize {
        configured
    }

    /// 达到上限是否算作收敛警告
    fn warns_on_iteration_cap(&self) -> bool {
        true
    }

    /// 时间步开始，重置残差历史
    fn begin_time_step(&mut self);

    /// 第 `interface` 个界面对在本次外迭代的松弛因子
    fn factor(&mut self, interface: usize, residual: &[DVec3]) -> f64;

    /// 各界面对最近一次使用的因子
    fn current_factors(&self) -> Vec<f64>;
}

// ============================================================================
// 弱耦合
// ============================================================================

/// 弱耦合：每步只执行一次，不做外迭代修正
#[derive(Debug, Clone)]
pub struct WeakCoupling {
    n_interfaces: usize,
}

impl WeakCoupling {
    /// 创建
    pub fn new(n_interfaces: usize) -> Self {
        Self { n_interfaces }
    }
}

impl RelaxationStrategy for WeakCoupling {
    fn scheme(&self) -> CouplingScheme {
        CouplingScheme::WeakCoupling
    }

    fn max_outer_iterations(&self, _configured: usize) -> usize {
        1
    }

    fn warns_on_iteration_cap(&self) -> bool {
        false
    }

    fn begin_time_step(&mut self) {}

    fn factor(&mut self, _interface: usize, _residual: &[DVec3]) -> f64 {
        1.0
    }

    fn current_factors(&self) -> Vec<f64> {
        vec![1.0; self.n_interfaces]
    }
}

// ============================================================================
// 固定松弛
// ============================================================================

/// 固定松弛因子
#[derive(Debug, Clone)]
pub struct FixedRelaxation {
    factor: f64,
    n_interfaces: usize,
}

impl FixedRelaxation {
    /// 创建
    pub fn new(factor: f64, n_interfaces: usize) -> Self {
        Self {
            factor,
            n_interfaces,
        }
    }
}

impl RelaxationStrategy for FixedRelaxation {
    fn scheme(&self) -> CouplingScheme {
        CouplingScheme::FixedRelaxation
    }

    fn begin_time_step(&mut self) {}

    fn factor(&mut self, _interface: usize, _residual: &[DVec3]) -> f64 {
        self.factor
    }

    fn current_factors(&self) -> Vec<f64> {
        vec![self.factor; self.n_interfaces]
    }
}

// ============================================================================
// Aitken
// ============================================================================

#[derive(Debug, Clone)]
struct AitkenState {
    factor: f64,
    initial: f64,
    previous: Option<Vec<DVec3>>,
}

/// 向量 Aitken Δ² 动态松弛
///
/// ```text
/// f_k = -f_{k-1} · r_{k-1}·(r_k - r_{k-1}) / |r_k - r_{k-1}|²
/// ```
///
/// 结果截断到 `[-max, max]`。时间步开始时因子取最大值，或按
/// [`AitkenSeed::PreviousStep`] 沿用上一步结束时的值。上一残差的平方范数
/// 小于 `SMALL` 时视为没有历史，使用本步初值。
#[derive(Debug, Clone)]
pub struct AitkenRelaxation {
    max_factor: f64,
    seed: AitkenSeed,
    states: Vec<AitkenState>,
}

impl AitkenRelaxation {
    /// 创建
    pub fn new(max_factor: f64, seed: AitkenSeed, n_interfaces: usize) -> Self {
        Self {
            max_factor,
            seed,
            states: vec![
                AitkenState {
                    factor: max_factor,
                    initial: max_factor,
                    previous: None,
                };
                n_interfaces
            ],
        }
    }

    /// 由上一因子与两次残差计算新因子
    pub fn update_factor(
        previous_factor: f64,
        previous: &[DVec3],
        current: &[DVec3],
        max_factor: f64,
    ) -> f64 {
        let diff: Vec<DVec3> = current.iter().zip(previous).map(|(c, p)| *c - *p).collect();
        let denom = norm_squared(&diff);
        if denom <= VSMALL {
            return previous_factor;
        }
        let f = -previous_factor * dot(previous, &diff) / denom;
        f.clamp(-max_factor, max_factor)
    }
}

impl RelaxationStrategy for AitkenRelaxation {
    fn scheme(&self) -> CouplingScheme {
        CouplingScheme::Aitken
    }

    fn begin_time_step(&mut self) {
        for state in &mut self.states {
            state.initial = match self.seed {
                AitkenSeed::Maximum => self.max_factor,
                AitkenSeed::PreviousStep => state.factor,
            };
            state.factor = state.initial;
            state.previous = None;
        }
    }

    fn factor(&mut self, interface: usize, residual: &[DVec3]) -> f64 {
        let max_factor = self.max_factor;
        let state = &mut self.states[interface];

        state.factor = match state.previous.as_deref() {
            Some(prev) if norm_squared(prev) >= SMALL => {
                Self::update_factor(state.factor, prev, residual, max_factor)
            }
            _ => state.initial,
        };
        state.previous = Some(residual.to_vec());

        debug!("Aitken: 界面对 {} 松弛因子 {:.6}", interface, state.factor);
        state.factor
    }

    fn current_factors(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.factor).collect()
    }
}

// ============================================================================
// 工厂
// ============================================================================

/// 按配置构建松弛策略
pub fn create_relaxation(config: &CouplingConfig, n_interfaces: usize) -> Box<dyn RelaxationStrategy> {
    match config.coupling {
        CouplingScheme::WeakCoupling => Box::new(WeakCoupling::new(n_interfaces)),
        CouplingScheme::FixedRelaxation => {
            Box::new(FixedRelaxation::new(config.relaxation_factor, n_interfaces))
        }
        CouplingScheme::Aitken => Box::new(AitkenRelaxation::new(
            config.relaxation_factor_max,
            config.aitken_seed,
            n_interfaces,
        )),
    }
}
