// crates/fsi_mapping/src/lib.rs

//! 流固耦合界面映射
//!
//! 在两个互不匹配的界面离散之间传递面量或点量（标量与矢量）。
//!
//! # 映射方法
//!
//! | 方法 | 类型 | 适用场景 |
//! |------|------|----------|
//! | [`DirectMap`] | 收集（gather） | 拓扑一致的界面，逐位精确 |
//! | [`RbfMap`] | 稠密矩阵 | 完全不匹配的界面，任意分辨率 |
//! | [`OverlapMap`] | 稀疏面积权重 | 需要近似守恒积分量（如总力） |
//!
//! 三种方法都实现 [`InterfaceMapper`]，由 [`create_mapper`] 按配置标签构建。
//! 传递算子按两侧界面的 [`fsi_mesh::VersionKey`] 缓存。
//!
//! # 示例
//!
//! ```rust
//! use fsi_config::{InterfacePairConfig, MapperType};
//! use fsi_mapping::create_mapper;
//! use fsi_mesh::generation::RectZoneGenerator;
//!
//! let fluid = RectZoneGenerator::new(4, 4, 1.0, 1.0).build("fluidWall").unwrap();
//! let solid = RectZoneGenerator::new(2, 2, 1.0, 1.0).build("solidWall").unwrap();
//!
//! let pair = InterfacePairConfig::new("wall", "fluidWall", "solidWall", MapperType::Overlap);
//! let mut mapper = create_mapper(&pair);
//!
//! let pressure = vec![2.0; fluid.n_faces()];
//! let mapped = mapper.transfer_faces_scalar(&fluid, &solid, &pressure).unwrap();
//! assert!(mapped.iter().all(|p| (p - 2.0).abs() < 1e-12));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod direct;
pub mod error;
pub mod field;
pub mod mapper;
pub mod operator;
pub mod overlap;
pub mod rbf;

pub use direct::DirectMap;
pub use error::{MappingError, MappingResult};
pub use field::{FieldLocation, FieldValue};
pub use mapper::{create_mapper, create_mapper_from_tag, InterfaceMapper, MappingStats};
pub use operator::{SparseRows, TransferOperator};
pub use overlap::OverlapMap;
pub use rbf::RbfMap;
