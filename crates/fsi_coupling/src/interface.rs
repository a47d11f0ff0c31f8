// crates/fsi_coupling/src/interface.rs

//! 耦合界面：每个时间步的分区外迭代
//!
//! # 算法
//!
//! ```text
//! [预测] 流体牵引力 → 固体面, 固体 evolve, r = 映射(固体位移) - D
//! for k = 1..=N:
//!     D += f_k · r                       (松弛, f_k 由策略给出)
//!     广播 D, 移动流体界面
//!     流体 evolve
//!     流体牵引力 → 固体面, 固体 evolve
//!     r = 映射(固体位移 → 流体点) - D
//!     记录 (time, k, Σ rms(r))
//!     收敛或 k == N 时退出
//! update_total_fields 与可选的附加网格修正（顺序可配置）
//! ```
//!
//! D 是流体界面点的总位移估计，每个界面对一份。残差在时间步之间保留：
//! 不做预测时，下一步的第一次松弛使用上一步最后的残差。

use log::{debug, info, trace, warn};

use fsi_config::{CouplingConfig, MeshCorrectionOrder};
use fsi_mapping::{create_mapper, InterfaceMapper};
use fsi_mesh::DVec3;

use crate::collaborator::{FluidCollaborator, SolidCollaborator};
use crate::communicator::{Communicator, SerialCommunicator};
use crate::convergence_log::ConvergenceLog;
use crate::diagnostics::{CouplingStatus, RunDiagnostics, StepReport};
use crate::error::{CouplingError, CouplingResult};
use crate::relaxation::{create_relaxation, RelaxationStrategy};
use crate::residual::{axpy, residual, rms};

/// 一个耦合界面对的运行状态
struct CoupledPair {
    name: String,
    fluid_zone: usize,
    solid_zone: usize,
    mapper: Box<dyn InterfaceMapper>,
    /// 流体界面点位移估计
    estimate: Vec<DVec3>,
    /// 待松弛的残差
    pending: Vec<DVec3>,
}

/// 耦合界面
pub struct CouplingInterface<F, S> {
    config: CouplingConfig,
    fluid: F,
    solid: S,
    pairs: Vec<CoupledPair>,
    relaxation: Box<dyn RelaxationStrategy>,
    communicator: Box<dyn Communicator>,
    log: ConvergenceLog,
    status: CouplingStatus,
    diagnostics: RunDiagnostics,
}

impl<F: FluidCollaborator, S: SolidCollaborator> CouplingInterface<F, S> {
    /// 串行创建
    pub fn new(config: CouplingConfig, fluid: F, solid: S) -> CouplingResult<Self> {
        Self::with_communicator(config, fluid, solid, Box::new(SerialCommunicator))
    }

    /// 指定通信器创建
    ///
    /// 配置在这里校验，任何配置错误都在第一个时间步之前返回。
    pub fn with_communicator(
        config: CouplingConfig,
        fluid: F,
        solid: S,
        communicator: Box<dyn Communicator>,
    ) -> CouplingResult<Self> {
        config.validate()?;

        let n_fluid = fluid.interface_zones().len();
        let n_solid = solid.interface_zones().len();
        if config.interfaces.len() > n_fluid || config.interfaces.len() > n_solid {
            return Err(CouplingError::ZoneCountMismatch {
                pairs: config.interfaces.len(),
                fluid: n_fluid,
                solid: n_solid,
            });
        }

        let mut pairs = Vec::with_capacity(config.interfaces.len());
        for pc in &config.interfaces {
            let fluid_zone = fluid
                .interface_zones()
                .iter()
                .position(|z| z.name() == pc.fluid_zone)
                .ok_or_else(|| CouplingError::UnknownZone {
                    side: "fluid",
                    zone: pc.fluid_zone.clone(),
                    pair: pc.name.clone(),
                })?;
            let solid_zone = solid
                .interface_zones()
                .iter()
                .position(|z| z.name() == pc.solid_zone)
                .ok_or_else(|| CouplingError::UnknownZone {
                    side: "solid",
                    zone: pc.solid_zone.clone(),
                    pair: pc.name.clone(),
                })?;

            // 地址表等与构型无关的算子须在任何变形之前建立
            let mut mapper = create_mapper(pc);
            let mapper_name = mapper.name();
            mapper
                .prepare(
                    &fluid.interface_zones()[fluid_zone],
                    &solid.interface_zones()[solid_zone],
                )
                .map_err(|e| CouplingError::mapping(pc.name.clone(), mapper_name, e))?;

            let n_points = fluid.interface_zones()[fluid_zone].n_points();
            pairs.push(CoupledPair {
                name: pc.name.clone(),
                fluid_zone,
                solid_zone,
                mapper,
                estimate: vec![DVec3::ZERO; n_points],
                pending: vec![DVec3::ZERO; n_points],
            });
            info!(
                "耦合界面对 '{}': {} <-> {} ({})",
                pc.name,
                pc.fluid_zone,
                pc.solid_zone,
                pc.mapping.tag()
            );
        }

        let relaxation = create_relaxation(&config, pairs.len());
        let log = if config.write_residuals_to_file && communicator.is_master() {
            ConvergenceLog::create(&config.residual_file)?
        } else {
            ConvergenceLog::in_memory()
        };

        info!(
            "FSI 耦合: {}, 容差 {:.1e}, 外迭代上限 {}",
            config.coupling.tag(),
            config.outer_corr_tolerance,
            config.n_outer_corr
        );

        Ok(Self {
            config,
            fluid,
            solid,
            pairs,
            relaxation,
            communicator,
            log,
            status: CouplingStatus::Idle,
            diagnostics: RunDiagnostics::default(),
        })
    }

    // =========================================================================
    // 访问
    // =========================================================================

    /// 当前状态
    pub fn status(&self) -> CouplingStatus {
        self.status
    }

    /// 配置
    pub fn config(&self) -> &CouplingConfig {
        &self.config
    }

    /// 流体求解器
    pub fn fluid(&self) -> &F {
        &self.fluid
    }

    /// 流体求解器（可变，用于推进时间）
    pub fn fluid_mut(&mut self) -> &mut F {
        &mut self.fluid
    }

    /// 固体求解器
    pub fn solid(&self) -> &S {
        &self.solid
    }

    /// 固体求解器（可变）
    pub fn solid_mut(&mut self) -> &mut S {
        &mut self.solid
    }

    /// 界面对数量
    pub fn n_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// 第 i 个界面对的流体界面点位移估计
    pub fn estimate(&self, pair: usize) -> &[DVec3] {
        &self.pairs[pair].estimate
    }

    /// 第 i 个界面对最近一次计算的残差
    pub fn residual(&self, pair: usize) -> &[DVec3] {
        &self.pairs[pair].pending
    }

    /// 第 i 个界面对使用的映射器
    pub fn mapper(&self, pair: usize) -> &dyn InterfaceMapper {
        self.pairs[pair].mapper.as_ref()
    }

    /// 收敛记录
    pub fn convergence_log(&self) -> &ConvergenceLog {
        &self.log
    }

    /// 运行诊断
    pub fn diagnostics(&self) -> &RunDiagnostics {
        &self.diagnostics
    }

    // =========================================================================
    // 时间步
    // =========================================================================

    /// 执行一个时间步的耦合
    pub fn evolve(&mut self) -> CouplingResult<StepReport> {
        self.set_status(CouplingStatus::Idle);
        let time = self.fluid.time();
        self.relaxation.begin_time_step();

        if self.config.predict_solid {
            self.set_status(CouplingStatus::Predicting);
            self.transfer_traction()?;
            if !self.solid.evolve() {
                return Err(CouplingError::solid("预测步求解失败"));
            }
            self.update_residuals()?;
        }

        let cap = self.relaxation.max_outer_iterations(self.config.n_outer_corr);
        let tolerance = self.config.outer_corr_tolerance;
        self.set_status(CouplingStatus::OuterIterating);

        let mut iterations = 0;
        let (status, residual_norm) = loop {
            iterations += 1;

            self.relax_and_move()?;
            info!(
                "时间 = {}, FSI 外迭代 {}, 松弛因子 = {:?}",
                time,
                iterations,
                self.relaxation.current_factors()
            );

            if !self.fluid.evolve() {
                return Err(CouplingError::fluid(format!("外迭代 {iterations} 求解失败")));
            }
            self.transfer_traction()?;
            if !self.solid.evolve() {
                return Err(CouplingError::solid(format!("外迭代 {iterations} 求解失败")));
            }

            let norm = self.update_residuals()?;
            self.log.record(time, iterations, norm)?;
            info!("FSI 残差范数 = {:.6e}", norm);

            if norm <= tolerance {
                break (CouplingStatus::Converged, norm);
            }
            if iterations >= cap {
                if self.relaxation.warns_on_iteration_cap() {
                    warn!(
                        "时间 {} 的 FSI 外迭代达到上限 {}, 残差范数 {:.6e} 未达到容差 {:.1e}",
                        time, iterations, norm, tolerance
                    );
                } else {
                    debug!("弱耦合: 时间 {} 残差范数 {:.6e}", time, norm);
                }
                break (CouplingStatus::MaxIterationsReached, norm);
            }
        };
        self.set_status(status);

        match self.config.mesh_correction_order {
            MeshCorrectionOrder::AfterTotalFields => {
                self.solid.update_total_fields();
                if self.config.additional_mesh_correction {
                    self.additional_mesh_correction()?;
                }
            }
            MeshCorrectionOrder::BeforeTotalFields => {
                if self.config.additional_mesh_correction {
                    self.additional_mesh_correction()?;
                }
                self.solid.update_total_fields();
            }
        }

        self.log.flush()?;

        let report = StepReport {
            time,
            status,
            iterations,
            residual_norm,
            relaxation_factors: self.relaxation.current_factors(),
        };
        self.diagnostics
            .record(&report, self.relaxation.warns_on_iteration_cap());
        self.diagnostics.conservation_warnings = self
            .pairs
            .iter()
            .map(|p| p.mapper.stats().conservation_warnings.get())
            .sum();

        Ok(report)
    }

    /// 结束运行：刷新记录并输出总结
    pub fn finish(&mut self) -> CouplingResult<RunDiagnostics> {
        self.log.flush()?;
        self.diagnostics.log_summary();
        Ok(self.diagnostics.clone())
    }

    // =========================================================================
    // 内部
    // =========================================================================

    fn set_status(&mut self, status: CouplingStatus) {
        trace!("FSI 状态: {} -> {}", self.status, status);
        self.status = status;
    }

    /// 流体面牵引力映射到固体面
    fn transfer_traction(&mut self) -> CouplingResult<()> {
        let Self {
            fluid,
            solid,
            pairs,
            ..
        } = self;

        for pair in pairs.iter_mut() {
            let traction = fluid.interface_traction(pair.fluid_zone);
            let mapper_name = pair.mapper.name();
            let mapped = pair
                .mapper
                .transfer_faces_vector(
                    &fluid.interface_zones()[pair.fluid_zone],
                    &solid.interface_zones()[pair.solid_zone],
                    &traction,
                )
                .map_err(|e| CouplingError::mapping(pair.name.clone(), mapper_name, e))?;
            solid
                .set_interface_traction(pair.solid_zone, &mapped)
                .map_err(|e| CouplingError::solid(e.to_string()))?;
        }
        Ok(())
    }

    /// 计算各界面对残差，返回各界面对 RMS 之和
    fn update_residuals(&mut self) -> CouplingResult<f64> {
        let Self {
            fluid,
            solid,
            pairs,
            ..
        } = self;

        let mut norm = 0.0;
        for pair in pairs.iter_mut() {
            let displacement = solid.interface_displacement(pair.solid_zone);
            let mapper_name = pair.mapper.name();
            let mapped = pair
                .mapper
                .transfer_points_vector(
                    &solid.interface_zones()[pair.solid_zone],
                    &fluid.interface_zones()[pair.fluid_zone],
                    &displacement,
                )
                .map_err(|e| CouplingError::mapping(pair.name.clone(), mapper_name, e))?;
            pair.pending = residual(&mapped, &pair.estimate);
            norm += rms(&pair.pending);
        }
        Ok(norm)
    }

    /// 按松弛因子更新位移估计并移动流体界面
    fn relax_and_move(&mut self) -> CouplingResult<()> {
        let Self {
            fluid,
            pairs,
            relaxation,
            communicator,
            ..
        } = self;

        for (i, pair) in pairs.iter_mut().enumerate() {
            let factor = relaxation.factor(i, &pair.pending);
            axpy(&mut pair.estimate, factor, &pair.pending);
            communicator.broadcast(&mut pair.estimate);
            fluid
                .move_interface(pair.fluid_zone, &pair.estimate)
                .map_err(|e| CouplingError::fluid(e.to_string()))?;
        }
        Ok(())
    }

    /// 不松弛地把流体界面对齐到固体位移，残差清零
    fn additional_mesh_correction(&mut self) -> CouplingResult<()> {
        self.update_residuals()?;

        let Self {
            fluid,
            pairs,
            communicator,
            ..
        } = self;

        for pair in pairs.iter_mut() {
            axpy(&mut pair.estimate, 1.0, &pair.pending);
            communicator.broadcast(&mut pair.estimate);
            fluid
                .move_interface(pair.fluid_zone, &pair.estimate)
                .map_err(|e| CouplingError::fluid(e.to_string()))?;
            pair.pending.iter_mut().for_each(|r| *r = DVec3::ZERO);
        }
        debug!("附加网格修正完成");
        Ok(())
    }
}
