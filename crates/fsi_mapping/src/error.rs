// crates/fsi_mapping/src/error.rs

//! 映射错误类型
//!
//! 所有映射错误都是致命错误：不存在安全的部分传递恢复。

use fsi_config::ConfigError;
use fsi_foundation::FsiError;
use thiserror::Error;

use crate::field::FieldLocation;

/// 映射结果类型
pub type MappingResult<T> = Result<T, MappingError>;

/// 映射错误
#[derive(Error, Debug)]
pub enum MappingError {
    /// 场长度与界面基数不符
    #[error("界面 '{zone}' 的{location}场长度不匹配: 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 界面名
        zone: String,
        /// 场位置
        location: FieldLocation,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 容差内找不到一致的对应元素
    #[error(
        "界面 '{zone}' 的{location} {index} 在容差 {tolerance:e} 内没有对应元素（最近距离 {distance:e}）"
    )]
    UnmatchedGeometry {
        /// 目标界面名
        zone: String,
        /// 场位置
        location: FieldLocation,
        /// 目标元素编号
        index: usize,
        /// 最近距离
        distance: f64,
        /// 容差
        tolerance: f64,
    },

    /// 两个界面的拓扑不一致
    #[error("界面 '{source_zone}' 与 '{target_zone}' 的{location}数量不一致: {source_count} vs {target_count}")]
    NonConformalZones {
        /// 源界面名
        source_zone: String,
        /// 目标界面名
        target_zone: String,
        /// 场位置
        location: FieldLocation,
        /// 源数量
        source_count: usize,
        /// 目标数量
        target_count: usize,
    },

    /// 多个目标元素匹配到同一个源元素
    #[error("界面 '{zone}' 的{location} {first} 与 {second} 匹配到同一个源元素 {source_index}")]
    NonInjectiveMatch {
        /// 目标界面名
        zone: String,
        /// 场位置
        location: FieldLocation,
        /// 先匹配的目标元素
        first: usize,
        /// 后匹配的目标元素
        second: usize,
        /// 源元素编号
        source_index: usize,
    },

    /// 目标面位于源界面投影范围内，但法向距离超出搜索范围
    #[error(
        "界面 '{zone}' 的面 {face} 与源界面的法向距离 {gap:e} 超出搜索范围 {limit:e}"
    )]
    NormalGapExceeded {
        /// 目标界面名
        zone: String,
        /// 目标面编号
        face: usize,
        /// 法向距离
        gap: f64,
        /// 搜索范围
        limit: f64,
    },

    /// 插值系统奇异
    #[error("界面 '{zone}' 的插值系统奇异（维数 {size}）")]
    SingularSystem {
        /// 源界面名
        zone: String,
        /// 系统维数
        size: usize,
    },

    /// 界面为空
    #[error("界面 '{0}' 没有可用于插值的元素")]
    EmptyZone(String),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MappingError {
    /// 是否为几何不匹配类错误
    pub fn is_geometry_mismatch(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedGeometry { .. }
                | Self::NonConformalZones { .. }
                | Self::NonInjectiveMatch { .. }
                | Self::NormalGapExceeded { .. }
        )
    }
}

impl From<MappingError> for FsiError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::SizeMismatch {
                zone,
                location,
                expected,
                actual,
            } => FsiError::size_mismatch(format!("{zone}.{}", location.tag()), expected, actual),
            MappingError::Config(e) => e.into(),
            e if e.is_geometry_mismatch() => FsiError::geometry_mismatch(e.to_string()),
            other => FsiError::internal(other.to_string()),
        }
    }
}
