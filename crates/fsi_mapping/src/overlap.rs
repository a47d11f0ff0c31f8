// crates/fsi_mapping/src/overlap.rs

//! 面积重叠映射
//!
//! 面传递：对每个目标面，用包围盒 R-Tree 找出候选源面（搜索框沿法向扫掠，
//! 容纳两侧界面的法向间隙），把候选源面与目标面一起投影到目标面平面上做
//! 凸多边形裁剪，得到重叠面积 aⱼ。权重
//! wⱼ = aⱼ / A_target；若覆盖率与 1 的差在 `coverage_tolerance` 之内则归一化
//! 为和为 1，否则保留覆盖比例（未覆盖部分视为零贡献）。
//!
//! 这是保守的选择：界面上的积分量（如总力）近似守恒。每次面传递后比较
//! 传递前后的面积分，超出 `conservation_tolerance` 时记录警告。
//!
//! 点传递：目标点投影到最近的源面，按到该面各顶点的反距离归一化加权。

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use fsi_config::{MapperType, OverlapSettings};
use fsi_mesh::geometry::{closest_point_on_face, inverse_distance_weights, overlap_area, PlaneFrame};
use fsi_mesh::{BoundingBox3, DVec3, FaceBoxIndex, InterfaceZone};

use crate::cache::{CachePolicy, OperatorCache};
use crate::error::{MappingError, MappingResult};
use crate::field::FieldLocation;
use crate::mapper::{InterfaceMapper, MappingStats};
use crate::operator::{SparseRows, TransferOperator};

/// 面积重叠映射器
#[derive(Debug)]
pub struct OverlapMap {
    settings: OverlapSettings,
    cache: OperatorCache,
    stats: MappingStats,
}

impl OverlapMap {
    /// 创建映射器
    pub fn new(settings: OverlapSettings) -> Self {
        Self {
            settings,
            cache: OperatorCache::new(CachePolicy::Motion),
            stats: MappingStats::default(),
        }
    }

    /// 映射参数
    pub fn settings(&self) -> &OverlapSettings {
        &self.settings
    }
}

impl Default for OverlapMap {
    fn default() -> Self {
        Self::new(OverlapSettings::default())
    }
}

// ============================================================================
// 面权重
// ============================================================================

/// 计算面重叠权重
///
/// 候选源面的搜索框是目标面沿 ±法向扫掠 `normal_gap_factor × 源界面对角线`
/// 后的包围盒，两侧界面沿法向分离时仍能找到重叠面。候选中只保留法向距离
/// 最近的一层（容差为目标面尺寸的一半），曲面背侧的面不参与加权。
pub fn build_face_weights(
    source: &InterfaceZone,
    target: &InterfaceZone,
    settings: &OverlapSettings,
) -> MappingResult<SparseRows> {
    if source.n_faces() == 0 {
        return Err(MappingError::EmptyZone(source.name().to_string()));
    }

    let index = FaceBoxIndex::build(source, 0.0);
    let source_faces: Vec<_> = (0..source.n_faces()).map(|f| source.face_coordinates(f)).collect();
    let gap_limit = settings.normal_gap_factor * source.bounding_box().diagonal();

    let rows: Vec<Vec<(usize, f64)>> = (0..target.n_faces())
        .into_par_iter()
        .map(|face| face_row(source, &source_faces, &index, target, face, settings, gap_limit))
        .collect::<MappingResult<_>>()?;

    let partial = rows
        .iter()
        .filter(|row| (row.iter().map(|(_, w)| w).sum::<f64>() - 1.0).abs() > settings.coverage_tolerance)
        .count();
    debug!(
        "overlap: {} -> {} 面权重完成, {} / {} 个目标面部分覆盖, 法向搜索范围 {:.3e}",
        source.name(),
        target.name(),
        partial,
        target.n_faces(),
        gap_limit
    );

    Ok(SparseRows::from_rows(rows))
}

/// 单个目标面的权重行
fn face_row(
    source: &InterfaceZone,
    source_faces: &[Vec<DVec3>],
    index: &FaceBoxIndex,
    target: &InterfaceZone,
    face: usize,
    settings: &OverlapSettings,
    gap_limit: f64,
) -> MappingResult<Vec<(usize, f64)>> {
    let area_vec = target.face_area_vectors()[face];
    let target_area = area_vec.length();
    let Some(frame) = PlaneFrame::new(target.face_centres()[face], area_vec) else {
        return Ok(Vec::new());
    };
    let target_poly = target.face_coordinates(face);

    let mut search = BoundingBox3::empty();
    for p in &target_poly {
        search.include(*p + frame.normal * gap_limit);
        search.include(*p - frame.normal * gap_limit);
    }
    let search = search.expand(settings.search_expansion * target_area.sqrt());

    // (源面, 重叠面积, 法向距离)
    let hits: Vec<(usize, f64, f64)> = index
        .intersecting(&search)
        .into_iter()
        .filter_map(|s| {
            let a = overlap_area(&source_faces[s], &target_poly, &frame);
            let gap = frame.signed_distance(source.face_centres()[s]).abs();
            (a > f64::EPSILON * target_area && gap <= gap_limit).then_some((s, a, gap))
        })
        .collect();

    if hits.is_empty() {
        check_outside_footprint(source, target, face, &frame, index, gap_limit)?;
        return Ok(Vec::new());
    }

    let nearest = hits.iter().map(|h| h.2).fold(f64::INFINITY, f64::min);
    let layer = nearest + 0.5 * target_area.sqrt();
    let mut row: Vec<(usize, f64)> = hits
        .into_iter()
        .filter(|h| h.2 <= layer)
        .map(|(s, a, _)| (s, a))
        .collect();

    let covered: f64 = row.iter().map(|(_, a)| a).sum();
    let denom = if (covered / target_area - 1.0).abs() <= settings.coverage_tolerance {
        covered
    } else {
        target_area
    };
    for (_, w) in &mut row {
        *w /= denom;
    }
    Ok(row)
}

/// 没有重叠源面的目标面必须位于源界面投影范围之外
///
/// 目标面中心沿法向落在源界面上，说明重叠面只是超出了法向搜索范围。
fn check_outside_footprint(
    source: &InterfaceZone,
    target: &InterfaceZone,
    face: usize,
    frame: &PlaneFrame,
    index: &FaceBoxIndex,
    gap_limit: f64,
) -> MappingResult<()> {
    let centre = frame.origin;
    let closest = index.closest_face(centre, |s| {
        let coords = source.face_coordinates(s);
        closest_point_on_face(centre, &coords, source.face_area_vectors()[s]).1
    });
    let Some((s, distance)) = closest else {
        return Ok(());
    };

    let coords = source.face_coordinates(s);
    let (cp, _) = closest_point_on_face(centre, &coords, source.face_area_vectors()[s]);
    let offset = cp - centre;
    let in_plane = offset - frame.normal * offset.dot(frame.normal);
    let size = target.face_area(face).sqrt();

    if in_plane.length() <= 1e-6 * size {
        return Err(MappingError::NormalGapExceeded {
            zone: target.name().to_string(),
            face,
            gap: distance,
            limit: gap_limit,
        });
    }
    Ok(())
}

// ============================================================================
// 点权重
// ============================================================================

/// 计算点投影权重
pub fn build_point_weights(
    source: &InterfaceZone,
    target: &InterfaceZone,
) -> MappingResult<SparseRows> {
    if source.n_faces() == 0 {
        return Err(MappingError::EmptyZone(source.name().to_string()));
    }

    let index = FaceBoxIndex::build(source, 0.0);

    let rows: Vec<Vec<(usize, f64)>> = target
        .points()
        .par_iter()
        .map(|p| {
            let best = index.closest_face(*p, |face| {
                let coords = source.face_coordinates(face);
                closest_point_on_face(*p, &coords, source.face_area_vectors()[face]).1
            });

            match best {
                Some((face, _)) => {
                    let coords = source.face_coordinates(face);
                    let (cp, _) =
                        closest_point_on_face(*p, &coords, source.face_area_vectors()[face]);
                    let weights = inverse_distance_weights(cp, &coords);
                    source
                        .face_point_indices(face)
                        .iter()
                        .zip(weights)
                        .map(|(&j, w)| (j as usize, w))
                        .collect()
                }
                None => Vec::new(),
            }
        })
        .collect();

    Ok(SparseRows::from_rows(rows))
}

impl InterfaceMapper for OverlapMap {
    fn mapper_type(&self) -> MapperType {
        MapperType::Overlap
    }

    fn operator(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
    ) -> MappingResult<(Arc<TransferOperator>, bool)> {
        let settings = self.settings;
        self.cache.get_or_build(source, target, location, || {
            let rows = match location {
                FieldLocation::Faces => build_face_weights(source, target, &settings)?,
                FieldLocation::Points => build_point_weights(source, target)?,
            };
            Ok(TransferOperator::Sparse(rows))
        })
    }

    fn stats(&self) -> &MappingStats {
        &self.stats
    }

    fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn conservation_tolerance(&self) -> Option<f64> {
        Some(self.settings.conservation_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_mesh::generation::RectZoneGenerator;

    #[test]
    fn test_face_weights_refined() {
        // 2x1 源面对应 1x1 目标面：每个源面覆盖一半
        let source = RectZoneGenerator::new(2, 1, 1.0, 1.0).build("s").unwrap();
        let target = RectZoneGenerator::new(1, 1, 1.0, 1.0).flipped().build("t").unwrap();
        let rows = build_face_weights(&source, &target, &OverlapSettings::default()).unwrap();
        let row: Vec<_> = rows.row(0).collect();
        assert_eq!(row.len(), 2);
        assert!(row.iter().all(|(_, w)| (w - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_partial_coverage_keeps_fraction() {
        let source = RectZoneGenerator::new(1, 1, 0.5, 1.0).build("s").unwrap();
        let target = RectZoneGenerator::new(1, 1, 1.0, 1.0).build("t").unwrap();
        let rows = build_face_weights(&source, &target, &OverlapSettings::default()).unwrap();
        assert!((rows.row_sum(0) - 0.5).abs() < 1e-12);

        let mut mapper = OverlapMap::default();
        let out = mapper.transfer_faces_scalar(&source, &target, &[4.0]).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_conservation_warning_counted() {
        // 目标只覆盖源的一半，面积分必然不守恒
        let source = RectZoneGenerator::new(2, 1, 2.0, 1.0).build("s").unwrap();
        let target = RectZoneGenerator::new(1, 1, 1.0, 1.0).build("t").unwrap();
        let mut mapper = OverlapMap::default();
        mapper.transfer_faces_scalar(&source, &target, &[1.0, 1.0]).unwrap();
        assert_eq!(mapper.stats().conservation_warnings.get(), 1);
    }

    #[test]
    fn test_point_weights_reproduce_constant_and_vertex_values() {
        let source = RectZoneGenerator::new(1, 1, 1.0, 1.0).build("s").unwrap();
        let target = RectZoneGenerator::new(2, 2, 1.0, 1.0)
            .with_origin(DVec3::new(0.0, 0.0, 1e-3))
            .build("t")
            .unwrap();
        let mut mapper = OverlapMap::default();

        let constant = vec![DVec3::new(0.0, 0.0, -1.0); source.n_points()];
        let out = mapper.transfer_points_vector(&source, &target, &constant).unwrap();
        assert!(out.iter().all(|v| (*v - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12));

        // 目标点与源顶点重合时精确取值
        let field: Vec<f64> = (0..source.n_points()).map(|i| i as f64).collect();
        let out = mapper.transfer_points_scalar(&source, &target, &field).unwrap();
        assert!((out[0] - 0.0).abs() < 1e-12);
        assert!((out[2] - 1.0).abs() < 1e-12);
        assert!((out[8] - 3.0).abs() < 1e-12);
    }

    fn offset_target(dz: f64) -> InterfaceZone {
        RectZoneGenerator::new(4, 4, 1.0, 1.0)
            .with_origin(DVec3::new(0.0, 0.0, dz))
            .flipped()
            .build("t")
            .unwrap()
    }

    #[test]
    fn test_face_weights_across_normal_gap() {
        let source = RectZoneGenerator::new(4, 4, 1.0, 1.0).build("s").unwrap();
        for dz in [0.05, -0.3, 0.8] {
            let target = offset_target(dz);
            let mut mapper = OverlapMap::default();
            let out = mapper
                .transfer_faces_scalar(&source, &target, &[7.0; 16])
                .unwrap();
            assert!(out.iter().all(|v| (v - 7.0).abs() < 1e-12), "dz = {dz}: {out:?}");
            assert_eq!(mapper.stats().conservation_warnings.get(), 0);
        }
    }

    #[test]
    fn test_gap_beyond_search_range_is_error() {
        let source = RectZoneGenerator::new(4, 4, 1.0, 1.0).build("s").unwrap();
        let target = offset_target(0.05);
        let settings = OverlapSettings {
            normal_gap_factor: 0.01,
            ..OverlapSettings::default()
        };
        let err = build_face_weights(&source, &target, &settings).unwrap_err();
        match &err {
            MappingError::NormalGapExceeded { zone, gap, .. } => {
                assert_eq!(zone, "t");
                assert!((gap - 0.05).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_geometry_mismatch());
    }

    #[test]
    fn test_face_outside_footprint_stays_empty() {
        let source = RectZoneGenerator::new(1, 1, 1.0, 1.0).build("s").unwrap();
        let target = RectZoneGenerator::new(2, 1, 2.0, 1.0)
            .with_origin(DVec3::new(0.0, 0.0, 0.2))
            .build("t")
            .unwrap();
        let rows = build_face_weights(&source, &target, &OverlapSettings::default()).unwrap();
        assert!((rows.row_sum(0) - 1.0).abs() < 1e-12);
        assert_eq!(rows.row(1).count(), 0);
    }

    #[test]
    fn test_only_nearest_layer_contributes() {
        // 两层平行的源面，目标更靠近 z = 0 的一层
        let source = InterfaceZone::new(
            "s",
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
                DVec3::new(0.0, 0.0, 0.5),
                DVec3::new(1.0, 0.0, 0.5),
                DVec3::new(1.0, 1.0, 0.5),
                DVec3::new(0.0, 1.0, 0.5),
            ],
            &[vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
        )
        .unwrap();
        let target = offset_target(0.1);
        let mut mapper = OverlapMap::default();
        let out = mapper.transfer_faces_scalar(&source, &target, &[3.0, 9.0]).unwrap();
        assert!(out.iter().all(|v| (v - 3.0).abs() < 1e-12), "{out:?}");
    }
}
