// crates/fsi_mesh/src/spatial_index.rs

//! 界面空间索引
//!
//! 基于 R-Tree 的三维空间索引，供映射器构建传递算子时使用：
//!
//! - [`PointCloudIndex`]: 点云最近点查询（直接映射的点/面中心匹配）
//! - [`FaceBoxIndex`]: 面包围盒相交查询（重叠映射的候选面筛选）

use glam::DVec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::BoundingBox3;
use crate::zone::InterfaceZone;

#[inline]
fn to_array(p: DVec3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

// ============================================================
// 点云索引
// ============================================================

/// 带编号的点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    /// 点在原数组中的编号
    pub index: usize,
    /// 坐标
    pub position: [f64; 3],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// 点云最近点索引
pub struct PointCloudIndex {
    tree: RTree<IndexedPoint>,
}

impl PointCloudIndex {
    /// 批量构建
    pub fn build(points: &[DVec3]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(index, p)| IndexedPoint {
                index,
                position: to_array(*p),
            })
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// 点数量
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// 最近点，返回 (编号, 距离)
    pub fn nearest(&self, p: DVec3) -> Option<(usize, f64)> {
        let query = to_array(p);
        self.tree
            .nearest_neighbor(&query)
            .map(|item| (item.index, item.distance_2(&query).sqrt()))
    }
}

// ============================================================
// 面包围盒索引
// ============================================================

/// 面的轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceEnvelope {
    /// 面编号
    pub face: usize,
    /// 最小角点
    pub min: [f64; 3],
    /// 最大角点
    pub max: [f64; 3],
}

impl FaceEnvelope {
    /// 由包围盒创建
    pub fn new(face: usize, bb: &BoundingBox3) -> Self {
        Self {
            face,
            min: to_array(bb.min),
            max: to_array(bb.max),
        }
    }
}

impl RTreeObject for FaceEnvelope {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for FaceEnvelope {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        // 点到 AABB 的最短距离平方
        (0..3)
            .map(|i| {
                let d = if point[i] < self.min[i] {
                    self.min[i] - point[i]
                } else if point[i] > self.max[i] {
                    point[i] - self.max[i]
                } else {
                    0.0
                };
                d * d
            })
            .sum()
    }

    fn contains_point(&self, point: &[f64; 3]) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

/// 面包围盒索引
pub struct FaceBoxIndex {
    tree: RTree<FaceEnvelope>,
}

impl FaceBoxIndex {
    /// 从界面区域构建，每个面包围盒外扩 `expansion`（绝对长度）
    ///
    /// 外扩用于容纳两侧界面法向上的小间隙。
    pub fn build(zone: &InterfaceZone, expansion: f64) -> Self {
        let items = (0..zone.n_faces())
            .map(|face| FaceEnvelope::new(face, &zone.face_bounding_box(face).expand(expansion)))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// 面数量
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// 与包围盒相交的面编号（升序）
    pub fn intersecting(&self, bb: &BoundingBox3) -> Vec<usize> {
        let query = AABB::from_corners(to_array(bb.min), to_array(bb.max));
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|item| item.face)
            .collect();
        found.sort_unstable();
        found
    }

    /// 真实距离最近的面
    ///
    /// 按包围盒距离由近到远遍历，`exact_distance` 给出点到面的真实距离。
    /// 包围盒距离是真实距离的下界，超过当前最优即停止。
    pub fn closest_face<F>(&self, p: DVec3, mut exact_distance: F) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> f64,
    {
        let query = to_array(p);
        let mut best: Option<(usize, f64)> = None;
        for item in self.tree.nearest_neighbor_iter(&query) {
            if let Some((_, d)) = best {
                if item.distance_2(&query).sqrt() > d {
                    break;
                }
            }
            let d = exact_distance(item.face);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((item.face, d));
            }
        }
        best
    }

}
