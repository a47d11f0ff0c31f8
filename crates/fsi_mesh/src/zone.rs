// crates/fsi_mesh/src/zone.rs

//! 界面区域
//!
//! 求解器一侧参与耦合的边界面片（interface zone）的只读快照，
//! 采用 SoA 布局：点坐标、面-点连接（offsets + indices 压缩格式），
//! 以及由当前（变形后）构型导出的面中心与面积矢量。
//!
//! # 版本
//!
//! - `topology_version`: 面-点连接或点数改变时递增
//! - `motion_version`: 点坐标改变时递增
//!
//! 映射器以 [`VersionKey`] 作为缓存键，任一版本变化即视为失效。
//! 区域身份 `uid` 在构造时分配，克隆不会改变它。

use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec3;

use fsi_foundation::SMALL;

use crate::error::{MeshError, MeshResult};
use crate::geometry::{face_centre_and_area, BoundingBox3};

static NEXT_ZONE_UID: AtomicU64 = AtomicU64::new(1);

fn next_uid() -> u64 {
    NEXT_ZONE_UID.fetch_add(1, Ordering::Relaxed)
}

/// 映射缓存失效令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionKey {
    /// 区域身份
    pub uid: u64,
    /// 拓扑版本
    pub topology: u64,
    /// 运动版本
    pub motion: u64,
}

impl VersionKey {
    /// 仅比较身份与拓扑（忽略运动）
    pub fn same_topology(&self, other: &Self) -> bool {
        self.uid == other.uid && self.topology == other.topology
    }
}

/// 界面区域
#[derive(Debug, Clone)]
pub struct InterfaceZone {
    name: String,
    uid: u64,

    // ===== 点数据 =====
    points: Vec<DVec3>,

    // ===== 面数据 =====
    face_offsets: Vec<usize>,
    face_indices: Vec<u32>,
    face_centres: Vec<DVec3>,
    face_area_vectors: Vec<DVec3>,

    // ===== 版本 =====
    topology_version: u64,
    motion_version: u64,
}

impl InterfaceZone {
    /// 从点坐标与面-点列表创建界面区域
    ///
    /// # 错误
    ///
    /// - 面顶点少于 3 个
    /// - 面引用越界的点
    /// - 面积为零的退化面
    pub fn new(
        name: impl Into<String>,
        points: Vec<DVec3>,
        faces: &[Vec<usize>],
    ) -> MeshResult<Self> {
        let name = name.into();
        let (face_offsets, face_indices) = compress_faces(&name, points.len(), faces)?;

        let mut zone = Self {
            name,
            uid: next_uid(),
            points,
            face_offsets,
            face_indices,
            face_centres: Vec::new(),
            face_area_vectors: Vec::new(),
            topology_version: 0,
            motion_version: 0,
        };
        zone.update_geometry();
        zone.check_degenerate()?;
        Ok(zone)
    }

    // =========================================================================
    // 基本访问
    // =========================================================================

    /// 区域名
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 区域身份
    #[inline]
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// 点数量
    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// 面数量
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face_offsets.len() - 1
    }

    /// 点坐标
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// 面中心
    #[inline]
    pub fn face_centres(&self) -> &[DVec3] {
        &self.face_centres
    }

    /// 面积矢量（模为面积，方向为面法向）
    #[inline]
    pub fn face_area_vectors(&self) -> &[DVec3] {
        &self.face_area_vectors
    }

    /// 面的顶点编号
    #[inline]
    pub fn face_point_indices(&self, face: usize) -> &[u32] {
        &self.face_indices[self.face_offsets[face]..self.face_offsets[face + 1]]
    }

    /// 面的顶点坐标
    pub fn face_coordinates(&self, face: usize) -> Vec<DVec3> {
        self.face_point_indices(face)
            .iter()
            .map(|&p| self.points[p as usize])
            .collect()
    }

    /// 单个面的面积
    #[inline]
    pub fn face_area(&self, face: usize) -> f64 {
        self.face_area_vectors[face].length()
    }

    /// 全部面积
    pub fn face_areas(&self) -> Vec<f64> {
        self.face_area_vectors.iter().map(|a| a.length()).collect()
    }

    /// 面单位法向
    pub fn face_normal(&self, face: usize) -> DVec3 {
        self.face_area_vectors[face].normalize_or_zero()
    }

    /// 区域总面积
    pub fn total_area(&self) -> f64 {
        self.face_area_vectors.iter().map(|a| a.length()).sum()
    }

    // =========================================================================
    // 版本
    // =========================================================================

    /// 拓扑版本
    #[inline]
    pub fn topology_version(&self) -> u64 {
        self.topology_version
    }

    /// 运动版本
    #[inline]
    pub fn motion_version(&self) -> u64 {
        self.motion_version
    }

    /// 当前版本令牌
    #[inline]
    pub fn version_key(&self) -> VersionKey {
        VersionKey {
            uid: self.uid,
            topology: self.topology_version,
            motion: self.motion_version,
        }
    }

    // =========================================================================
    // 修改
    // =========================================================================

    /// 替换点坐标（网格运动），运动版本递增
    pub fn set_points(&mut self, points: Vec<DVec3>) -> MeshResult<()> {
        if points.len() != self.points.len() {
            return Err(MeshError::PointCountMismatch {
                zone: self.name.clone(),
                expected: self.points.len(),
                actual: points.len(),
            });
        }
        self.points = points;
        self.motion_version += 1;
        self.update_geometry();
        Ok(())
    }

    /// 按位移增量移动点，运动版本递增
    pub fn displace_points(&mut self, displacement: &[DVec3]) -> MeshResult<()> {
        if displacement.len() != self.points.len() {
            return Err(MeshError::PointCountMismatch {
                zone: self.name.clone(),
                expected: self.points.len(),
                actual: displacement.len(),
            });
        }
        for (p, d) in self.points.iter_mut().zip(displacement) {
            *p += *d;
        }
        self.motion_version += 1;
        self.update_geometry();
        Ok(())
    }

    /// 替换拓扑（重划分），拓扑与运动版本都递增
    pub fn reset_topology(&mut self, points: Vec<DVec3>, faces: &[Vec<usize>]) -> MeshResult<()> {
        let (offsets, indices) = compress_faces(&self.name, points.len(), faces)?;
        self.points = points;
        self.face_offsets = offsets;
        self.face_indices = indices;
        self.topology_version += 1;
        self.motion_version += 1;
        self.update_geometry();
        self.check_degenerate()
    }

    // =========================================================================
    // 派生量
    // =========================================================================

    /// 包围盒
    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(&self.points)
    }

    /// 单个面的包围盒
    pub fn face_bounding_box(&self, face: usize) -> BoundingBox3 {
        let mut bb = BoundingBox3::empty();
        for &p in self.face_point_indices(face) {
            bb.include(self.points[p as usize]);
        }
        bb
    }

    /// 点-面邻接表
    pub fn point_faces(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.points.len()];
        for face in 0..self.n_faces() {
            for &p in self.face_point_indices(face) {
                adjacency[p as usize].push(face);
            }
        }
        adjacency
    }

    /// 每个面的最短边长
    pub fn min_edge_length_at_faces(&self) -> Vec<f64> {
        (0..self.n_faces())
            .map(|face| {
                let idx = self.face_point_indices(face);
                let n = idx.len();
                (0..n)
                    .map(|i| {
                        let a = self.points[idx[i] as usize];
                        let b = self.points[idx[(i + 1) % n] as usize];
                        a.distance(b)
                    })
                    .fold(f64::MAX, f64::min)
            })
            .collect()
    }

    /// 每个点所连接边的最短长度
    pub fn min_edge_length_at_points(&self) -> Vec<f64> {
        let mut min_len = vec![f64::MAX; self.points.len()];
        for face in 0..self.n_faces() {
            let idx = self.face_point_indices(face);
            let n = idx.len();
            for i in 0..n {
                let a = idx[i] as usize;
                let b = idx[(i + 1) % n] as usize;
                let len = self.points[a].distance(self.points[b]);
                min_len[a] = min_len[a].min(len);
                min_len[b] = min_len[b].min(len);
            }
        }
        // 孤立点没有边
        for len in &mut min_len {
            if *len == f64::MAX {
                *len = 0.0;
            }
        }
        min_len
    }

    /// 面量转点量（相邻面算术平均）
    pub fn face_to_point_average(&self, face_values: &[DVec3]) -> MeshResult<Vec<DVec3>> {
        if face_values.len() != self.n_faces() {
            return Err(MeshError::PointCountMismatch {
                zone: self.name.clone(),
                expected: self.n_faces(),
                actual: face_values.len(),
            });
        }
        Ok(self
            .point_faces()
            .iter()
            .map(|faces| {
                if faces.is_empty() {
                    DVec3::ZERO
                } else {
                    faces.iter().map(|&f| face_values[f]).sum::<DVec3>() / faces.len() as f64
                }
            })
            .collect())
    }

    // =========================================================================
    // 内部
    // =========================================================================

    fn update_geometry(&mut self) {
        let n_faces = self.n_faces();
        self.face_centres.clear();
        self.face_area_vectors.clear();
        self.face_centres.reserve(n_faces);
        self.face_area_vectors.reserve(n_faces);

        for face in 0..n_faces {
            let (centre, area) = face_centre_and_area(&self.face_coordinates(face));
            self.face_centres.push(centre);
            self.face_area_vectors.push(area);
        }
    }

    fn check_degenerate(&self) -> MeshResult<()> {
        for face in 0..self.n_faces() {
            let area = self.face_area(face);
            let scale = self.face_bounding_box(face).diagonal();
            if area <= SMALL * scale * scale {
                return Err(MeshError::DegenerateFace {
                    zone: self.name.clone(),
                    face,
                    area,
                });
            }
        }
        Ok(())
    }
}

fn compress_faces(
    zone: &str,
    n_points: usize,
    faces: &[Vec<usize>],
) -> MeshResult<(Vec<usize>, Vec<u32>)> {
    let mut offsets = Vec::with_capacity(faces.len() + 1);
    let mut indices = Vec::with_capacity(faces.iter().map(Vec::len).sum());
    offsets.push(0);

    for (face, verts) in faces.iter().enumerate() {
        if verts.len() < 3 {
            return Err(MeshError::FaceTooSmall {
                zone: zone.to_string(),
                face,
                n_points: verts.len(),
            });
        }
        for &p in verts {
            if p >= n_points {
                return Err(MeshError::PointOutOfRange {
                    zone: zone.to_string(),
                    face,
                    point: p,
                    n_points,
                });
            }
            indices.push(p as u32);
        }
        offsets.push(indices.len());
    }

    Ok((offsets, indices))
}
