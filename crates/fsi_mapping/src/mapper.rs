// crates/fsi_mapping/src/mapper.rs

//! 界面映射器接口与工厂
//!
//! 每个映射器由配置绑定到一对界面（流体侧、固体侧），但两个方向都能传递：
//! `transfer_*(from, to, field)` 既可流体→固体，也可固体→流体，
//! 每个方向、每种场位置各缓存一个算子。

use std::sync::Arc;

use glam::DVec3;
use log::{trace, warn};

use fsi_config::{InterfacePairConfig, MapperType};
use fsi_foundation::{Counter, SMALL};
use fsi_mesh::InterfaceZone;

use crate::direct::DirectMap;
use crate::error::{MappingError, MappingResult};
use crate::field::{area_integral, FieldLocation, FieldValue};
use crate::operator::TransferOperator;
use crate::overlap::OverlapMap;
use crate::rbf::RbfMap;

// ============================================================================
// 统计
// ============================================================================

/// 映射统计
#[derive(Debug, Clone, Default)]
pub struct MappingStats {
    /// 算子构建次数
    pub operator_builds: Counter,
    /// 场传递次数
    pub transfers: Counter,
    /// 守恒性警告次数
    pub conservation_warnings: Counter,
}

// ============================================================================
// 映射器 trait
// ============================================================================

/// 界面映射器
///
/// 实现者只需提供算子构建（含缓存）；四个传递入口由默认方法完成
/// 长度检查、算子作用与统计。
pub trait InterfaceMapper: Send {
    /// 映射类型
    fn mapper_type(&self) -> MapperType;

    /// 映射器名称（配置标签）
    fn name(&self) -> &'static str {
        self.mapper_type().tag()
    }

    /// 取得（必要时构建）从 `source` 到 `target` 的传递算子
    ///
    /// 返回 (算子, 是否新建)
    fn operator(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
    ) -> MappingResult<(Arc<TransferOperator>, bool)>;

    /// 在参考构型下预先构建与构型无关的算子
    ///
    /// 耦合开始前调用一次，此时两侧界面尚未变形。权重依赖当前构型的映射器
    /// 无需预先构建。
    fn prepare(&mut self, _fluid: &InterfaceZone, _solid: &InterfaceZone) -> MappingResult<()> {
        Ok(())
    }

    /// 统计
    fn stats(&self) -> &MappingStats;

    /// 清空缓存算子
    fn clear_cache(&mut self);

    /// 面传递后的守恒检查的相对容差，`None` 表示不检查
    fn conservation_tolerance(&self) -> Option<f64> {
        None
    }

    /// 面标量传递
    fn transfer_faces_scalar(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        field: &[f64],
    ) -> MappingResult<Vec<f64>> {
        transfer(self, source, target, FieldLocation::Faces, field)
    }

    /// 面矢量传递
    fn transfer_faces_vector(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        field: &[DVec3],
    ) -> MappingResult<Vec<DVec3>> {
        transfer(self, source, target, FieldLocation::Faces, field)
    }

    /// 点标量传递
    fn transfer_points_scalar(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        field: &[f64],
    ) -> MappingResult<Vec<f64>> {
        transfer(self, source, target, FieldLocation::Points, field)
    }

    /// 点矢量传递
    fn transfer_points_vector(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        field: &[DVec3],
    ) -> MappingResult<Vec<DVec3>> {
        transfer(self, source, target, FieldLocation::Points, field)
    }
}

fn zone_size(zone: &InterfaceZone, location: FieldLocation) -> usize {
    match location {
        FieldLocation::Faces => zone.n_faces(),
        FieldLocation::Points => zone.n_points(),
    }
}

/// 检查场长度与界面基数一致
pub fn check_field_size<T>(
    zone: &InterfaceZone,
    location: FieldLocation,
    field: &[T],
) -> MappingResult<()> {
    let expected = zone_size(zone, location);
    if field.len() != expected {
        return Err(MappingError::SizeMismatch {
            zone: zone.name().to_string(),
            location,
            expected,
            actual: field.len(),
        });
    }
    Ok(())
}

fn transfer<M, T>(
    mapper: &mut M,
    source: &InterfaceZone,
    target: &InterfaceZone,
    location: FieldLocation,
    field: &[T],
) -> MappingResult<Vec<T>>
where
    M: InterfaceMapper + ?Sized,
    T: FieldValue,
{
    check_field_size(source, location, field)?;

    let (operator, built) = mapper.operator(source, target, location)?;
    if built {
        mapper.stats().operator_builds.inc();
        trace!(
            "{}: 构建 {} -> {} 的{}算子",
            mapper.name(),
            source.name(),
            target.name(),
            location
        );
    }

    let result = operator.apply(field);
    debug_assert_eq!(result.len(), zone_size(target, location));
    mapper.stats().transfers.inc();

    if location == FieldLocation::Faces {
        if let Some(tol) = mapper.conservation_tolerance() {
            check_conservation(mapper, source, target, field, &result, tol);
        }
    }

    Ok(result)
}

fn check_conservation<M, T>(
    mapper: &M,
    source: &InterfaceZone,
    target: &InterfaceZone,
    before: &[T],
    after: &[T],
    tolerance: f64,
) where
    M: InterfaceMapper + ?Sized,
    T: FieldValue,
{
    let integral_source = area_integral(&source.face_areas(), before);
    let integral_target = area_integral(&target.face_areas(), after);
    let scale = integral_source.length().max(integral_target.length());
    if scale < SMALL {
        return;
    }

    let rel = (integral_target - integral_source).length() / scale;
    if rel > tolerance {
        mapper.stats().conservation_warnings.inc();
        warn!(
            "{}: {} -> {} 面积分不守恒: 传递前 {:?}, 传递后 {:?}, 相对差 {:.3e} (容差 {:.1e})",
            mapper.name(),
            source.name(),
            target.name(),
            integral_source,
            integral_target,
            rel,
            tolerance
        );
    }
}

// ============================================================================
// 工厂
// ============================================================================

/// 按界面对配置构建映射器
pub fn create_mapper(pair: &InterfacePairConfig) -> Box<dyn InterfaceMapper> {
    match pair.mapping {
        MapperType::DirectMap => Box::new(DirectMap::new(pair.direct)),
        MapperType::Rbf => Box::new(RbfMap::new(pair.rbf)),
        MapperType::Overlap => Box::new(OverlapMap::new(pair.overlap)),
    }
}

/// 按标签构建映射器，未知标签返回 `UnknownMapperType`
pub fn create_mapper_from_tag(
    tag: &str,
    pair: &InterfacePairConfig,
) -> MappingResult<Box<dyn InterfaceMapper>> {
    let mapping: MapperType = tag.parse()?;
    let pair = InterfacePairConfig {
        mapping,
        ..pair.clone()
    };
    Ok(create_mapper(&pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_config::ConfigError;
    use fsi_mesh::generation::RectZoneGenerator;

    fn pair(mapping: MapperType) -> InterfacePairConfig {
        InterfacePairConfig::new("wall", "fluidWall", "solidWall", mapping)
    }

    #[test]
    fn test_factory_by_type() {
        for mapping in [MapperType::DirectMap, MapperType::Rbf, MapperType::Overlap] {
            let mapper = create_mapper(&pair(mapping));
            assert_eq!(mapper.mapper_type(), mapping);
        }
    }

    #[test]
    fn test_factory_unknown_tag() {
        let err = create_mapper_from_tag("nearestCell", &pair(MapperType::Rbf)).err().unwrap();
        assert!(matches!(
            err,
            MappingError::Config(ConfigError::UnknownMapperType { .. })
        ));
        let mapper = create_mapper_from_tag("AMI", &pair(MapperType::Rbf)).unwrap();
        assert_eq!(mapper.mapper_type(), MapperType::Overlap);
    }

    #[test]
    fn test_size_mismatch_before_work() {
        let a = RectZoneGenerator::new(2, 2, 1.0, 1.0).build("a").unwrap();
        let b = RectZoneGenerator::new(3, 3, 1.0, 1.0).build("b").unwrap();
        for mapping in [MapperType::DirectMap, MapperType::Rbf, MapperType::Overlap] {
            let mut mapper = create_mapper(&pair(mapping));
            let err = mapper.transfer_faces_scalar(&a, &b, &[1.0; 3]).unwrap_err();
            assert!(matches!(
                err,
                MappingError::SizeMismatch { expected: 4, actual: 3, .. }
            ));
            assert_eq!(mapper.stats().operator_builds.get(), 0);
        }
    }
}
