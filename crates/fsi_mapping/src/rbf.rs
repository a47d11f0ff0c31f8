// crates/fsi_mapping/src/rbf.rs

//! 径向基函数映射
//!
//! 以源界面位置 xⱼ 为中心构建插值：
//!
//! ```text
//! s(y) = Σⱼ αⱼ φ(|y - xⱼ|) + β
//! ```
//!
//! 带常数项时求解增广系统
//!
//! ```text
//! ┌ Φ  1 ┐ ┌ α ┐   ┌ f ┐
//! └ 1ᵀ 0 ┘ └ β ┘ = └ 0 ┘
//! ```
//!
//! 并把 "求解 + 在目标点求值" 合成为稠密权重矩阵 `W = B · A⁻¹ · E`，
//! 其中 `B` 为目标点处的基函数行（含常数列），`E = [I; 0]`。
//! 常数场因此被精确重现。
//!
//! 代价至少为 O(n²)（源点数 n），界面较大时是性能敏感路径。

use std::sync::Arc;

use glam::DVec3;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use fsi_config::{MapperType, RbfFunction, RbfSettings};
use fsi_foundation::SMALL;
use fsi_mesh::{BoundingBox3, InterfaceZone};

use crate::cache::{CachePolicy, OperatorCache};
use crate::error::{MappingError, MappingResult};
use crate::field::FieldLocation;
use crate::mapper::{InterfaceMapper, MappingStats};
use crate::operator::TransferOperator;

/// 基函数求值
///
/// `radius` 为支撑半径（Wendland）或形状尺度（Gaussian），薄板样条不使用。
#[inline]
pub fn basis(function: RbfFunction, r: f64, radius: f64) -> f64 {
    match function {
        RbfFunction::WendlandC2 => {
            let xi = r / radius;
            if xi >= 1.0 {
                0.0
            } else {
                (1.0 - xi).powi(4) * (4.0 * xi + 1.0)
            }
        }
        RbfFunction::Gaussian => {
            let xi = r / radius;
            (-xi * xi).exp()
        }
        RbfFunction::ThinPlateSpline => {
            if r < SMALL {
                0.0
            } else {
                r * r * r.ln()
            }
        }
    }
}

/// 径向基函数映射器
#[derive(Debug)]
pub struct RbfMap {
    settings: RbfSettings,
    cache: OperatorCache,
    stats: MappingStats,
}

impl RbfMap {
    /// 创建映射器
    pub fn new(settings: RbfSettings) -> Self {
        Self {
            settings,
            cache: OperatorCache::new(CachePolicy::Motion),
            stats: MappingStats::default(),
        }
    }

    /// 映射参数
    pub fn settings(&self) -> &RbfSettings {
        &self.settings
    }
}

impl Default for RbfMap {
    fn default() -> Self {
        Self::new(RbfSettings::default())
    }
}

/// 构建稠密插值权重
pub fn build_weights(
    zone_name: &str,
    centres: &[DVec3],
    targets: &[DVec3],
    settings: &RbfSettings,
) -> MappingResult<DMatrix<f64>> {
    let n = centres.len();
    let m = targets.len();
    if n == 0 {
        return Err(MappingError::EmptyZone(zone_name.to_string()));
    }

    let diagonal = BoundingBox3::from_points(centres).diagonal();
    let radius = if diagonal > SMALL {
        settings.radius_factor * diagonal
    } else {
        1.0
    };
    let function = settings.function;
    let poly = usize::from(settings.constant_term);
    let size = n + poly;

    // 插值矩阵 A
    let mut a = DMatrix::<f64>::zeros(size, size);
    for i in 0..n {
        for j in i..n {
            let phi = basis(function, centres[i].distance(centres[j]), radius);
            a[(i, j)] = phi;
            a[(j, i)] = phi;
        }
        if poly == 1 {
            a[(i, n)] = 1.0;
            a[(n, i)] = 1.0;
        }
    }

    // E = [I; 0]
    let mut e = DMatrix::<f64>::zeros(size, n);
    for i in 0..n {
        e[(i, i)] = 1.0;
    }

    let coeffs = a
        .lu()
        .solve(&e)
        .filter(|c| c.iter().all(|v| v.is_finite()))
        .ok_or_else(|| MappingError::SingularSystem {
            zone: zone_name.to_string(),
            size,
        })?;

    // 目标点处基函数行 B（按行并行）
    let rows: Vec<Vec<f64>> = targets
        .par_iter()
        .map(|y| {
            let mut row: Vec<f64> = centres
                .iter()
                .map(|x| basis(function, y.distance(*x), radius))
                .collect();
            if poly == 1 {
                row.push(1.0);
            }
            row
        })
        .collect();
    let b = DMatrix::from_fn(m, size, |i, j| rows[i][j]);

    debug!(
        "RBF: {} 个中心, {} 个目标, 半径 {:.3e}, 函数 {:?}",
        n, m, radius, function
    );

    Ok(b * coeffs)
}

impl InterfaceMapper for RbfMap {
    fn mapper_type(&self) -> MapperType {
        MapperType::Rbf
    }

    fn operator(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
    ) -> MappingResult<(Arc<TransferOperator>, bool)> {
        let settings = self.settings;
        self.cache.get_or_build(source, target, location, || {
            let (centres, targets) = match location {
                FieldLocation::Faces => (source.face_centres(), target.face_centres()),
                FieldLocation::Points => (source.points(), target.points()),
            };
            build_weights(source.name(), centres, targets, &settings).map(TransferOperator::Dense)
        })
    }

    fn stats(&self) -> &MappingStats {
        &self.stats
    }

    fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
