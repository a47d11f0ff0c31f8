// crates/fsi_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `FsiError` 枚举和 `FsiResult` 类型别名。各层（mesh、mapping、
//! coupling）定义自己的错误枚举，并通过 `From` 转换为 `FsiError`，
//! 以便跨层传递。
//!
//! # 错误分类
//!
//! | 类别 | 变体 | 处理方式 |
//! |------|------|----------|
//! | 配置错误 | `Config` / `InvalidConfig` / `MissingConfig` | 致命，时间推进前报告 |
//! | 几何不匹配 | `GeometryMismatch` | 致命，终止计算 |
//! | 尺寸不匹配 | `SizeMismatch` | 致命，调用方违反契约 |
//! | 外部求解器失败 | `Collaborator` | 致命 |
//!
//! 收敛警告与守恒警告不是错误，由 `fsi_coupling` 的诊断统计记录。

use thiserror::Error;

/// 统一结果类型
pub type FsiResult<T> = Result<T, FsiError>;

/// 流固耦合统一错误类型
#[derive(Error, Debug)]
pub enum FsiError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: String,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 无效网格拓扑
    #[error("无效的界面网格: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 界面几何不匹配
    #[error("界面几何不匹配: {message}")]
    GeometryMismatch {
        /// 具体错误信息（包含界面对与映射方法名称）
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少配置项
    #[error("缺少必需的配置项: {key}")]
    MissingConfig {
        /// 配置键名
        key: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 外部求解器（流体/固体）失败
    #[error("{which} 求解器失败: {message}")]
    Collaborator {
        /// 求解器名称
        which: String,
        /// 失败描述
        message: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl FsiError {
    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 几何不匹配
    pub fn geometry_mismatch(message: impl Into<String>) -> Self {
        Self::GeometryMismatch {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 外部求解器失败
    pub fn collaborator(which: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            which: which.into(),
            message: message.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为配置类错误（在时间推进之前即可发现）
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::MissingConfig { .. } | Self::InvalidConfig { .. }
        )
    }
}

impl From<std::io::Error> for FsiError {
    fn from(err: std::io::Error) -> Self {
        Self::io_with_source(err.to_string(), err)
    }
}
