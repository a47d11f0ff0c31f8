// crates/fsi_config/src/error.rs

//! 配置层错误类型

use fsi_foundation::FsiError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 未知的耦合策略标签
    #[error("未知的耦合策略 '{tag}' (可选: {supported:?})")]
    UnknownCouplingScheme {
        /// 输入的标签
        tag: String,
        /// 支持的标签
        supported: &'static [&'static str],
    },

    /// 未知的映射方法标签
    #[error("未知的映射类型 '{tag}' (可选: {supported:?})")]
    UnknownMapperType {
        /// 输入的标签
        tag: String,
        /// 支持的标签
        supported: &'static [&'static str],
    },

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("缺失配置: {0}")]
    Missing(String),
}

impl ConfigError {
    /// 构造无效值错误
    pub fn invalid(key: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for FsiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => FsiError::io_with_source("读取配置失败", e),
            ConfigError::InvalidValue { key, value, reason } => {
                FsiError::invalid_config(key, value, reason)
            }
            ConfigError::Missing(key) => FsiError::missing_config(key),
            other => FsiError::config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("n_outer_corr", 0, "必须 >= 1");
        assert!(err.to_string().contains("n_outer_corr"));
    }

    #[test]
    fn test_conversion_keeps_configuration_class() {
        let err: FsiError = ConfigError::UnknownMapperType {
            tag: "nearest".into(),
            supported: &["directMap"],
        }
        .into();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("nearest"));
    }
}
