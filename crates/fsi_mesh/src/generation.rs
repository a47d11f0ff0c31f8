// crates/fsi_mesh/src/generation.rs

//! 界面生成模块
//!
//! 提供简单的结构化界面生成工具，用于测试、基准算例与命令行演示：
//!
//! - [`RectZoneGenerator`]: 平面矩形界面（四边形或三角形面）
//!
//! # 使用示例
//!
//! ```rust
//! use fsi_mesh::generation::RectZoneGenerator;
//!
//! // 固体侧通常使用与流体侧相反的法向
//! let solid = RectZoneGenerator::new(3, 3, 1.0, 1.0)
//!     .flipped()
//!     .build("solidWall")
//!     .unwrap();
//! assert!(solid.face_normal(0).z < 0.0);
//! ```

use glam::DVec3;

use crate::error::{MeshError, MeshResult};
use crate::zone::InterfaceZone;

/// 平面矩形界面生成器
///
/// 界面位于 z = z0 平面，顶点按行主序排列
#[derive(Debug, Clone)]
pub struct RectZoneGenerator {
    /// x 方向面数
    nx: usize,
    /// y 方向面数
    ny: usize,
    /// x 方向长度 [m]
    lx: f64,
    /// y 方向长度 [m]
    ly: f64,
    /// 原点
    origin: DVec3,
    /// 每个矩形拆成两个三角形
    triangulate: bool,
    /// 法向朝 -z
    flip: bool,
}

impl RectZoneGenerator {
    /// 创建矩形界面生成器
    ///
    /// # 参数
    ///
    /// - `nx`: x 方向面数
    /// - `ny`: y 方向面数
    /// - `lx`: x 方向长度
    /// - `ly`: y 方向长度
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            origin: DVec3::ZERO,
            triangulate: false,
            flip: false,
        }
    }

    /// 设置原点
    pub fn with_origin(mut self, origin: DVec3) -> Self {
        self.origin = origin;
        self
    }

    /// 生成三角形面
    pub fn triangulated(mut self) -> Self {
        self.triangulate = true;
        self
    }

    /// 反转面法向
    pub fn flipped(mut self) -> Self {
        self.flip = true;
        self
    }

    /// 点总数
    pub fn n_points(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    /// 面总数
    pub fn n_faces(&self) -> usize {
        if self.triangulate {
            self.nx * self.ny * 2
        } else {
            self.nx * self.ny
        }
    }

    /// 构建界面区域
    pub fn build(&self, name: &str) -> MeshResult<InterfaceZone> {
        if self.nx == 0 || self.ny == 0 {
            return Err(MeshError::InvalidGeneration(format!(
                "面数必须为正: nx={}, ny={}",
                self.nx, self.ny
            )));
        }
        if !(self.lx > 0.0 && self.ly > 0.0) {
            return Err(MeshError::InvalidGeneration(format!(
                "长度必须为正: lx={}, ly={}",
                self.lx, self.ly
            )));
        }

        let dx = self.lx / self.nx as f64;
        let dy = self.ly / self.ny as f64;

        let mut points = Vec::with_capacity(self.n_points());
        for j in 0..=self.ny {
            for i in 0..=self.nx {
                points.push(self.origin + DVec3::new(i as f64 * dx, j as f64 * dy, 0.0));
            }
        }

        let idx = |i: usize, j: usize| j * (self.nx + 1) + i;

        let mut faces = Vec::with_capacity(self.n_faces());
        for j in 0..self.ny {
            for i in 0..self.nx {
                let v00 = idx(i, j);
                let v10 = idx(i + 1, j);
                let v11 = idx(i + 1, j + 1);
                let v01 = idx(i, j + 1);

                if self.triangulate {
                    faces.push(vec![v00, v10, v11]);
                    faces.push(vec![v00, v11, v01]);
                } else {
                    faces.push(vec![v00, v10, v11, v01]);
                }
            }
        }

        if self.flip {
            for face in &mut faces {
                face.reverse();
            }
        }

        InterfaceZone::new(name, points, &faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_zone() {
        let zone = RectZoneGenerator::new(4, 2, 2.0, 1.0).build("wall").unwrap();
        assert_eq!(zone.n_points(), 15);
        assert_eq!(zone.n_faces(), 8);
        assert!((zone.total_area() - 2.0).abs() < 1e-12);
        assert!(zone.face_normal(0).z > 0.0);
    }

    #[test]
    fn test_triangulated_zone() {
        let gen = RectZoneGenerator::new(3, 3, 1.5, 1.5)
            .with_origin(DVec3::new(0.0, 0.0, 2.0))
            .triangulated();
        let zone = gen.build("tri").unwrap();
        assert_eq!(zone.n_faces(), gen.n_faces());
        assert_eq!(zone.n_faces(), 18);
        assert!((zone.total_area() - 2.25).abs() < 1e-12);
        assert!((zone.bounding_box().min.z - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_flipped_zone() {
        let zone = RectZoneGenerator::new(2, 2, 1.0, 1.0).flipped().build("s").unwrap();
        assert!(zone.face_area_vectors().iter().all(|a| a.z < 0.0));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(RectZoneGenerator::new(0, 2, 1.0, 1.0).build("x").is_err());
        assert!(RectZoneGenerator::new(2, 2, -1.0, 1.0).build("x").is_err());
    }
}
