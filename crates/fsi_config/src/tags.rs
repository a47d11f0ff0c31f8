// crates/fsi_config/src/tags.rs

//! 运行时类型选择标签
//!
//! 耦合策略与映射方法在算例配置中以字符串标签给出，构建时解析一次，
//! 之后以枚举形式存储。未知标签在解析阶段立即失败。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

// ============================================================
// 耦合策略
// ============================================================

/// 外迭代松弛策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CouplingScheme {
    /// 弱耦合：每个时间步只执行一次流体/固体求解
    WeakCoupling,
    /// 固定亚松弛因子
    FixedRelaxation,
    /// Aitken 动态亚松弛
    #[default]
    Aitken,
}

impl CouplingScheme {
    /// 支持的标签
    pub const TAGS: &'static [&'static str] = &["weakCoupling", "fixedRelaxation", "Aitken"];

    /// 配置文件中的标签
    pub fn tag(self) -> &'static str {
        match self {
            Self::WeakCoupling => "weakCoupling",
            Self::FixedRelaxation => "fixedRelaxation",
            Self::Aitken => "Aitken",
        }
    }
}

impl FromStr for CouplingScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weakCoupling" => Ok(Self::WeakCoupling),
            "fixedRelaxation" => Ok(Self::FixedRelaxation),
            "Aitken" => Ok(Self::Aitken),
            other => Err(ConfigError::UnknownCouplingScheme {
                tag: other.to_string(),
                supported: Self::TAGS,
            }),
        }
    }
}

impl TryFrom<String> for CouplingScheme {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CouplingScheme> for String {
    fn from(value: CouplingScheme) -> Self {
        value.tag().to_string()
    }
}

impl fmt::Display for CouplingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================
// 映射方法
// ============================================================

/// 界面到界面映射方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MapperType {
    /// 协调网格的一一对应直接映射
    DirectMap,
    /// 径向基函数插值
    #[default]
    Rbf,
    /// 面积加权重叠插值
    Overlap,
}

impl MapperType {
    /// 支持的标签（`AMI` 为 `overlap` 的别名）
    pub const TAGS: &'static [&'static str] = &["directMap", "RBF", "overlap", "AMI"];

    /// 配置文件中的标签
    pub fn tag(self) -> &'static str {
        match self {
            Self::DirectMap => "directMap",
            Self::Rbf => "RBF",
            Self::Overlap => "overlap",
        }
    }
}

impl FromStr for MapperType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directMap" => Ok(Self::DirectMap),
            "RBF" => Ok(Self::Rbf),
            "overlap" | "AMI" => Ok(Self::Overlap),
            other => Err(ConfigError::UnknownMapperType {
                tag: other.to_string(),
                supported: Self::TAGS,
            }),
        }
    }
}

impl TryFrom<String> for MapperType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MapperType> for String {
    fn from(value: MapperType) -> Self {
        value.tag().to_string()
    }
}

impl fmt::Display for MapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================
// 其他选项
// ============================================================

/// 每个时间步 Aitken 因子的初值来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AitkenSeed {
    /// 取允许的最大因子
    #[default]
    Maximum,
    /// 沿用上一时间步结束时的因子
    PreviousStep,
}

/// 附加网格修正相对于 `update_total_fields` 的执行顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeshCorrectionOrder {
    /// 先累加固体总量场，再修正流体网格
    #[default]
    AfterTotalFields,
    /// 先修正流体网格，再累加固体总量场
    BeforeTotalFields,
}

/// 径向基函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RbfFunction {
    /// Wendland C2 紧支函数 φ(ξ) = (1-ξ)⁴(4ξ+1)
    #[default]
    WendlandC2,
    /// 高斯函数 φ(ξ) = exp(-ξ²)
    Gaussian,
    /// 薄板样条 φ(r) = r² ln r
    ThinPlateSpline,
}
