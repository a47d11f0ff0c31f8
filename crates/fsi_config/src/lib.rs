// crates/fsi_config/src/lib.rs

//! 流固耦合配置层
//!
//! 提供耦合策略选择、界面映射方法选择和外迭代控制参数。
//! 配置由外部（算例字典、JSON 文件）提供，本层只负责反序列化、
//! 标签解析与取值校验，不参与任何计算。
//!
//! # 模块概览
//!
//! - [`coupling_config`]: `CouplingConfig` 及各子配置
//! - [`tags`]: 运行时类型选择标签（`CouplingScheme`、`MapperType` 等）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: fsi_cli       ─> 读取配置文件，驱动耦合
//! Layer 4: fsi_coupling  ─> 按 CouplingScheme 构建松弛策略
//! Layer 3: fsi_mapping   ─> 按 MapperType 构建映射器
//! Layer 2: fsi_config    ─> 本层
//! Layer 1: fsi_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coupling_config;
pub mod error;
pub mod tags;

// 重导出核心类型
pub use coupling_config::{
    CouplingConfig, DirectMapSettings, InterfacePairConfig, OverlapSettings, RbfSettings,
};
pub use error::ConfigError;
pub use tags::{AitkenSeed, CouplingScheme, MapperType, MeshCorrectionOrder, RbfFunction};
