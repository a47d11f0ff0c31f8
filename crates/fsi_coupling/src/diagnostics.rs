// crates/fsi_coupling/src/diagnostics.rs

//! 时间步报告与运行诊断

use std::fmt;

use log::{info, warn};

/// 耦合状态机
///
/// `Idle → Predicting → OuterIterating → Converged | MaxIterationsReached → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingStatus {
    /// 时间步之间
    Idle,
    /// 固体预测
    Predicting,
    /// 外迭代中
    OuterIterating,
    /// 残差范数达到容差
    Converged,
    /// 达到外迭代上限（非致命）
    MaxIterationsReached,
}

impl CouplingStatus {
    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::MaxIterationsReached)
    }
}

impl fmt::Display for CouplingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "Idle",
            Self::Predicting => "Predicting",
            Self::OuterIterating => "OuterIterating",
            Self::Converged => "Converged",
            Self::MaxIterationsReached => "MaxIterationsReached",
        };
        write!(f, "{s}")
    }
}

/// 单个时间步的耦合结果
#[derive(Debug, Clone)]
pub struct StepReport {
    /// 物理时间
    pub time: f64,
    /// 终止状态
    pub status: CouplingStatus,
    /// 外迭代次数
    pub iterations: usize,
    /// 最终残差范数
    pub residual_norm: f64,
    /// 各界面对最后使用的松弛因子
    pub relaxation_factors: Vec<f64>,
}

impl StepReport {
    /// 是否收敛
    pub fn is_converged(&self) -> bool {
        self.status == CouplingStatus::Converged
    }
}

/// 运行诊断
#[derive(Debug, Clone, Default)]
pub struct RunDiagnostics {
    /// 时间步数
    pub steps: usize,
    /// 收敛的时间步数
    pub converged_steps: usize,
    /// 达到外迭代上限的次数
    pub max_iterations_reached: usize,
    /// 外迭代总数
    pub total_outer_iterations: usize,
    /// 映射守恒警告总数
    pub conservation_warnings: u64,
    /// 最大的时间步最终残差
    pub worst_residual: f64,
}

impl RunDiagnostics {
    /// 记录一个时间步
    pub fn record(&mut self, report: &StepReport, counts_as_warning: bool) {
        self.steps += 1;
        self.total_outer_iterations += report.iterations;
        match report.status {
            CouplingStatus::Converged => self.converged_steps += 1,
            CouplingStatus::MaxIterationsReached if counts_as_warning => {
                self.max_iterations_reached += 1
            }
            _ => {}
        }
        self.worst_residual = self.worst_residual.max(report.residual_norm);
    }

    /// 平均外迭代次数
    pub fn mean_iterations(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_outer_iterations as f64 / self.steps as f64
        }
    }

    /// 输出运行总结
    pub fn log_summary(&self) {
        info!(
            "FSI 运行总结: {} 个时间步, {} 个收敛, 平均外迭代 {:.2}, 最大残差 {:.3e}",
            self.steps,
            self.converged_steps,
            self.mean_iterations(),
            self.worst_residual
        );
        if self.max_iterations_reached > 0 {
            warn!("{} 个时间步达到外迭代上限", self.max_iterations_reached);
        }
        if self.conservation_warnings > 0 {
            warn!("映射守恒警告 {} 次", self.conservation_warnings);
        }
    }
}
