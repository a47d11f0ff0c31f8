// crates/fsi_mapping/src/cache.rs

//! 传递算子缓存
//!
//! 以 (源界面, 目标界面, 场位置) 为槽位缓存算子，并记录构建时两侧界面的
//! [`VersionKey`]。查询时版本不一致即重建：
//!
//! - [`CachePolicy::Topology`]: 只比较拓扑版本（点位移不影响一一对应关系）
//! - [`CachePolicy::Motion`]: 同时比较运动版本（权重依赖当前构型）

use std::collections::HashMap;
use std::sync::Arc;

use fsi_mesh::{InterfaceZone, VersionKey};

use crate::error::MappingResult;
use crate::field::FieldLocation;
use crate::operator::TransferOperator;

/// 缓存失效策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// 拓扑变化时失效
    Topology,
    /// 拓扑或运动变化时失效
    Motion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Slot {
    source: u64,
    target: u64,
    location: FieldLocation,
}

#[derive(Debug)]
struct Entry {
    source: VersionKey,
    target: VersionKey,
    operator: Arc<TransferOperator>,
}

/// 算子缓存
#[derive(Debug)]
pub struct OperatorCache {
    policy: CachePolicy,
    entries: HashMap<Slot, Entry>,
}

impl OperatorCache {
    /// 创建空缓存
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    /// 失效策略
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// 缓存条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_current(&self, cached: &VersionKey, current: &VersionKey) -> bool {
        match self.policy {
            CachePolicy::Topology => cached.same_topology(current),
            CachePolicy::Motion => cached == current,
        }
    }

    fn slot(source: &InterfaceZone, target: &InterfaceZone, location: FieldLocation) -> Slot {
        Slot {
            source: source.uid(),
            target: target.uid(),
            location,
        }
    }

    /// 取仍然有效的缓存算子
    pub fn lookup(
        &self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
    ) -> Option<Arc<TransferOperator>> {
        let entry = self.entries.get(&Self::slot(source, target, location))?;
        (self.is_current(&entry.source, &source.version_key())
            && self.is_current(&entry.target, &target.version_key()))
        .then(|| Arc::clone(&entry.operator))
    }

    /// 按两侧界面的当前版本存入算子
    pub fn insert(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
        operator: Arc<TransferOperator>,
    ) {
        self.entries.insert(
            Self::slot(source, target, location),
            Entry {
                source: source.version_key(),
                target: target.version_key(),
                operator,
            },
        );
    }

    /// 取缓存算子，失效时调用 `build` 重建
    ///
    /// 返回 (算子, 是否新建)
    pub fn get_or_build<F>(
        &mut self,
        source: &InterfaceZone,
        target: &InterfaceZone,
        location: FieldLocation,
        build: F,
    ) -> MappingResult<(Arc<TransferOperator>, bool)>
    where
        F: FnOnce() -> MappingResult<TransferOperator>,
    {
        if let Some(operator) = self.lookup(source, target, location) {
            return Ok((operator, false));
        }

        let operator = Arc::new(build()?);
        self.insert(source, target, location, Arc::clone(&operator));
        Ok((operator, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_mesh::generation::RectZoneGenerator;
    use glam::DVec3;

    fn gather(n: usize) -> MappingResult<TransferOperator> {
        Ok(TransferOperator::Gather((0..n).collect()))
    }

    #[test]
    fn test_topology_policy_ignores_motion() {
        let a = RectZoneGenerator::new(2, 2, 1.0, 1.0).build("a").unwrap();
        let mut b = RectZoneGenerator::new(2, 2, 1.0, 1.0).build("b").unwrap();
        let mut cache = OperatorCache::new(CachePolicy::Topology);

        let (_, built) = cache.get_or_build(&a, &b, FieldLocation::Faces, || gather(4)).unwrap();
        assert!(built);

        b.displace_points(&vec![DVec3::Z * 0.01; b.n_points()]).unwrap();
        let (_, built) = cache.get_or_build(&a, &b, FieldLocation::Faces, || gather(4)).unwrap();
        assert!(!built);

        // 方向不同是不同槽位
        let (_, built) = cache.get_or_build(&b, &a, FieldLocation::Faces, || gather(4)).unwrap();
        assert!(built);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_motion_policy_rebuilds() {
        let a = RectZoneGenerator::new(2, 2, 1.0, 1.0).build("a").unwrap();
        let mut b = RectZoneGenerator::new(2, 2, 1.0, 1.0).build("b").unwrap();
        let mut cache = OperatorCache::new(CachePolicy::Motion);

        cache.get_or_build(&a, &b, FieldLocation::Points, || gather(9)).unwrap();
        let (_, built) = cache.get_or_build(&a, &b, FieldLocation::Points, || gather(9)).unwrap();
        assert!(!built);

        b.displace_points(&vec![DVec3::Z * 0.01; b.n_points()]).unwrap();
        let (_, built) = cache.get_or_build(&a, &b, FieldLocation::Points, || gather(9)).unwrap();
        assert!(built);
    }
}
