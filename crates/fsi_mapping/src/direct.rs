// crates/fsi_mapping/src/direct.rs

//! 直接映射
//!
//! 要求两侧界面拓扑一致（面数、点数相等）。对每个目标元素用最近点查询
//! 找到唯一的源元素，距离须小于 `relative_tolerance × 局部最短边长`。
//! 之后的传递是 O(n) 收集，值逐位原样传递。
//!
//! 地址表只在拓扑变化时重建，且须在两侧界面仍处于参考构型时建立：
//! 变形后的界面不再逐点重合。耦合开始前通过 [`InterfaceMapper::prepare`]
//! 一次建好面与点、正反两个方向的地址表。

use std::sync::Arc;

use log::debug;

use fsi_config::{DirectMapSettings, MapperType};
use fsi_mesh::{InterfaceZone, PointCloudIndex};

use crate::cache::{CachePolicy, OperatorCache};
use crate::error::{MappingError, MappingResult};
use crate::field::FieldLocation;
use crate::mapper::{InterfaceMapper, MappingStats};
use crate::operator::TransferOperator;

/// 直接映射器
#[derive(Debug)]
pub struct DirectMap {
    settings: DirectMapSettings,
    cache: OperatorCache,
    stats: MappingStats,
}

impl DirectMap {
    /// 创建直接映射器
    pub fn new(settings: DirectMapSettings) -> Self {
        Self {
            settings,
            cache: OperatorCache::new(CachePolicy::Topology),
            stats: MappingStats::default(),
        }
    }

    /// 映射参数
    pub fn settings(&self) -> &DirectMapSettings {
        &self.settings
    }
}

impl Default for DirectMap {
    fn default() -> Self {
        Self::new(DirectMapSettings::default())
    }
}

/// 构建一一对应的地址表
pub fn build_addressing(
    source: &InterfaceZone,
    target: &InterfaceZone,
    location: FieldLocation,
    relative_tolerance: f64,
) -> MappingResult<Vec<usize>> {
    let (source_pos, target_pos, local_length) = match location {
        FieldLocation::Faces => (
            source.face_centres(),
            target.face_centres(),
            target.min_edge_length_at_faces(),
        ),
        FieldLocation::Points => (
            source.points(),
            target.points(),
            target.min_edge_length_at_points(),
        ),
    };

    if source_pos.len() != target_pos.len() {
        return Err(MappingError::NonConformalZones {
            source_zone: source.name().to_string(),
            target_zone: target.name().to_string(),
            location,
            source_count: source_pos.len(),
            target_count: target_pos.len(),
        });
    }

    let index = PointCloudIndex::build(source_pos);
    let mut addressing = Vec::with_capacity(target_pos.len());
    let mut claimed_by = vec![usize::MAX; source_pos.len()];
    let mut max_distance = 0.0_f64;

    for (i, p) in target_pos.iter().enumerate() {
        let tolerance = relative_tolerance * local_length[i];
        let (j, distance) = index
            .nearest(*p)
            .ok_or_else(|| MappingError::EmptyZone(source.name().to_string()))?;

        if distance > tolerance {
            return Err(MappingError::UnmatchedGeometry {
                zone: target.name().to_string(),
                location,
                index: i,
                distance,
                tolerance,
            });
        }
        if claimed_by[j] != usize::MAX {
            return Err(MappingError::NonInjectiveMatch {
                zone: target.name().to_string(),
                location,
                first: claimed_by[j],
                second: i,
                source_index: j,
            });
        }

        claimed_by[j] = i;
        max_distance = max_distance.max(distance);
        addressing.push(j);
    }

    debug!(
        "directMap: {} -> {} {}地址表完成, 最大匹配距离 {:.3e}",
        source.name(),
        target.name(),
        location,
        max_distance
    );

    Ok(addressing)
}

/// 一一对应地址表的逆
fn invert(addressing: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; addressing.len()];
    for (i, &j) in addressing.iter().enumerate() {
        inverse[j] = i;
    }
    inverse
}

impl InterfaceMapper for DirectMap {
    fn mapper_type(&self) -> MapperType {
        MapperType::DirectMap
    }

    /// 两个方向的地址表一次建成：反方向就是逆置换。
    fn operator(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
    ) -> MappingResult<(Arc<TransferOperator>, bool)> {
        if let Some(operator) = self.cache.lookup(source, target, location) {
            return Ok((operator, false));
        }

        let addressing =
            build_addressing(source, target, location, self.settings.relative_tolerance)?;
        let reverse = Arc::new(TransferOperator::Gather(invert(&addressing)));
        let forward = Arc::new(TransferOperator::Gather(addressing));
        self.cache.insert(target, source, location, reverse);
        self.cache.insert(source, target, location, Arc::clone(&forward));
        Ok((forward, true))
    }

    fn prepare(&mut self, fluid: &InterfaceZone, solid: &InterfaceZone) -> MappingResult<()> {
        for location in [FieldLocation::Faces, FieldLocation::Points] {
            let (_, built) = self.operator(fluid, solid, location)?;
            if built {
                self.stats.operator_builds.inc();
            }
        }
        Ok(())
    }

    fn stats(&self) -> &MappingStats {
        &self.stats
    }

    fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
