// crates/fsi_coupling/src/error.rs

//! 耦合层错误类型
//!
//! 配置、几何与尺寸错误都是致命错误，立即向上传播并终止计算。
//! 映射错误附带界面对名称与映射器名称。

use std::path::PathBuf;

use fsi_config::ConfigError;
use fsi_foundation::FsiError;
use fsi_mapping::MappingError;
use thiserror::Error;

/// 耦合结果类型
pub type CouplingResult<T> = Result<T, CouplingError>;

/// 耦合错误
#[derive(Error, Debug)]
pub enum CouplingError {
    /// 界面映射失败
    #[error("界面对 '{pair}' 映射失败 (映射器 {mapper}): {source}")]
    Mapping {
        /// 界面对名称
        pair: String,
        /// 映射器名称
        mapper: &'static str,
        /// 底层错误
        #[source]
        source: MappingError,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 求解器协作方失败
    #[error("{which} 求解器失败: {message}")]
    Collaborator {
        /// 流体或固体
        which: &'static str,
        /// 描述
        message: String,
    },

    /// 找不到界面区域
    #[error("{side} 侧不存在界面区域 '{zone}' (界面对 '{pair}')")]
    UnknownZone {
        /// 流体或固体
        side: &'static str,
        /// 区域名
        zone: String,
        /// 界面对名称
        pair: String,
    },

    /// 界面对数量超过界面区域数量
    #[error("界面对数量 {pairs} 超过界面区域数量 (流体 {fluid}, 固体 {solid})")]
    ZoneCountMismatch {
        /// 配置的界面对数量
        pairs: usize,
        /// 流体界面区域数
        fluid: usize,
        /// 固体界面区域数
        solid: usize,
    },

    /// 收敛记录文件读写失败
    #[error("收敛记录文件 {path:?} 读写失败: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },
}

impl CouplingError {
    /// 包装映射错误
    pub fn mapping(pair: impl Into<String>, mapper: &'static str, source: MappingError) -> Self {
        Self::Mapping {
            pair: pair.into(),
            mapper,
            source,
        }
    }

    /// 流体求解器失败
    pub fn fluid(message: impl Into<String>) -> Self {
        Self::Collaborator {
            which: "fluid",
            message: message.into(),
        }
    }

    /// 固体求解器失败
    pub fn solid(message: impl Into<String>) -> Self {
        Self::Collaborator {
            which: "solid",
            message: message.into(),
        }
    }
}

impl From<CouplingError> for FsiError {
    fn from(err: CouplingError) -> Self {
        match err {
            CouplingError::Mapping { pair, mapper, source } => match FsiError::from(source) {
                FsiError::SizeMismatch {
                    name,
                    expected,
                    actual,
                } => FsiError::size_mismatch(format!("{pair}/{mapper}/{name}"), expected, actual),
                FsiError::GeometryMismatch { message } => {
                    FsiError::geometry_mismatch(format!("{pair} ({mapper}): {message}"))
                }
                other => FsiError::internal(format!("{pair} ({mapper}): {other}")),
            },
            CouplingError::Config(e) => e.into(),
            CouplingError::Collaborator { which, message } => FsiError::collaborator(which, message),
            CouplingError::Io { path, source } => {
                FsiError::io_with_source(format!("{}", path.display()), source)
            }
            other => FsiError::invalid_input(other.to_string()),
        }
    }
}
