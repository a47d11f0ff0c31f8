// crates/fsi_coupling/src/lib.rs

//! 分区式流固耦合引擎
//!
//! 驱动两个独立离散的求解器（流体、固体）在每个时间步达到一致状态：
//! 跨不匹配界面传递牵引力与位移，并用松弛策略加速不动点迭代。
//!
//! # 模块概览
//!
//! - [`collaborator`]: 流体/固体求解器接口
//! - [`communicator`]: 并行广播接口
//! - [`relaxation`]: 弱耦合、固定松弛、Aitken 松弛
//! - [`interface`]: `CouplingInterface` 外迭代状态机
//! - [`residual`]: 界面残差运算
//! - [`convergence_log`]: 收敛记录文件
//! - [`diagnostics`]: 时间步报告与运行诊断
//! - [`benchmark`]: 弹簧类比基准协作方
//!
//! # 示例
//!
//! ```rust
//! use fsi_config::{CouplingConfig, InterfacePairConfig, MapperType};
//! use fsi_coupling::benchmark::{SpringFluid, SpringSolid};
//! use fsi_coupling::{CouplingInterface, CouplingStatus};
//! use fsi_mesh::generation::RectZoneGenerator;
//! use fsi_mesh::DVec3;
//!
//! let fluid_zone = RectZoneGenerator::new(4, 4, 1.0, 1.0).build("fluidWall").unwrap();
//! let solid_zone = RectZoneGenerator::new(4, 4, 1.0, 1.0).flipped().build("solidWall").unwrap();
//!
//! let config = CouplingConfig {
//!     write_residuals_to_file: false,
//!     interfaces: vec![InterfacePairConfig::new(
//!         "wall", "fluidWall", "solidWall", MapperType::DirectMap,
//!     )],
//!     ..CouplingConfig::default()
//! };
//!
//! let fluid = SpringFluid::new(vec![fluid_zone], DVec3::new(0.0, 0.0, -1.0e3), 5.0e4);
//! let solid = SpringSolid::new(vec![solid_zone], 1.0e5);
//! let mut fsi = CouplingInterface::new(config, fluid, solid).unwrap();
//!
//! let report = fsi.evolve().unwrap();
//! assert_eq!(report.status, CouplingStatus::Converged);
//! assert!(report.iterations <= 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod benchmark;
pub mod collaborator;
pub mod communicator;
pub mod convergence_log;
pub mod diagnostics;
pub mod error;
pub mod interface;
pub mod relaxation;
pub mod residual;

pub use collaborator::{FluidCollaborator, SolidCollaborator};
pub use communicator::{Communicator, SerialCommunicator};
pub use convergence_log::{ConvergenceLog, ResidualRecord};
pub use diagnostics::{CouplingStatus, RunDiagnostics, StepReport};
pub use error::{CouplingError, CouplingResult};
pub use interface::CouplingInterface;
pub use relaxation::{
    create_relaxation, AitkenRelaxation, FixedRelaxation, RelaxationStrategy, WeakCoupling,
};
