// crates/fsi_mesh/src/lib.rs

//! 流固耦合界面网格模块
//!
//! 提供界面区域（interface zone）的只读 SoA 快照，以及映射算法所需的
//! 几何工具与空间索引。
//!
//! # 核心类型
//!
//! - [`InterfaceZone`]: 变形后构型下的面/点补丁，带拓扑版本与运动版本
//! - [`VersionKey`]: 映射器缓存失效令牌
//! - [`PointCloudIndex`] / [`FaceBoxIndex`]: 基于 R-Tree 的最近点与包围盒查询
//!
//! # 模块结构
//!
//! - [`zone`]: 界面区域
//! - [`geometry`]: 面几何、平面投影与凸多边形裁剪
//! - [`spatial_index`]: 空间索引
//! - [`generation`]: 结构化界面生成（测试与基准算例）
//!
//! # 示例
//!
//! ```rust
//! use fsi_mesh::generation::RectZoneGenerator;
//!
//! let zone = RectZoneGenerator::new(4, 2, 2.0, 1.0).build("wall").unwrap();
//! assert_eq!(zone.n_faces(), 8);
//! assert_eq!(zone.n_points(), 15);
//! assert!((zone.total_area() - 2.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod generation;
pub mod geometry;
pub mod spatial_index;
pub mod zone;

// 重新导出核心类型
pub use error::{MeshError, MeshResult};
pub use geometry::BoundingBox3;
pub use spatial_index::{FaceBoxIndex, FaceEnvelope, IndexedPoint, PointCloudIndex};
pub use zone::{InterfaceZone, VersionKey};

/// 重导出 glam 向量类型，方便上层使用
pub use glam::DVec3;
