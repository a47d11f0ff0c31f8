// crates/fsi_config/src/coupling_config.rs

//! CouplingConfig - 流固耦合配置
//!
//! 定义耦合控制循环的全部参数：松弛策略、外迭代容差与上限、
//! 预测步与附加网格修正开关，以及每个耦合界面对的映射方法。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::tags::{AitkenSeed, CouplingScheme, MapperType, MeshCorrectionOrder, RbfFunction};

/// 流固耦合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingConfig {
    /// 松弛策略
    #[serde(default)]
    pub coupling: CouplingScheme,

    /// 固定亚松弛因子
    #[serde(default = "default_relaxation_factor")]
    pub relaxation_factor: f64,

    /// Aitken 因子的最大幅值（同时作为初值）
    #[serde(default = "default_relaxation_factor_max")]
    pub relaxation_factor_max: f64,

    /// Aitken 因子初值来源
    #[serde(default)]
    pub aitken_seed: AitkenSeed,

    /// 外迭代残差容差
    #[serde(default = "default_outer_corr_tolerance")]
    pub outer_corr_tolerance: f64,

    /// 外迭代次数上限
    #[serde(default = "default_n_outer_corr")]
    pub n_outer_corr: usize,

    /// 是否使用固体预测步
    #[serde(default = "default_true")]
    pub predict_solid: bool,

    /// 是否在收敛后执行附加网格修正
    #[serde(default)]
    pub additional_mesh_correction: bool,

    /// 附加网格修正的执行顺序
    #[serde(default)]
    pub mesh_correction_order: MeshCorrectionOrder,

    /// 是否写残差文件
    #[serde(default = "default_true")]
    pub write_residuals_to_file: bool,

    /// 残差文件路径
    #[serde(default = "default_residual_file")]
    pub residual_file: PathBuf,

    /// 耦合界面对
    #[serde(default)]
    pub interfaces: Vec<InterfacePairConfig>,
}

fn default_relaxation_factor() -> f64 { 0.01 }
fn default_relaxation_factor_max() -> f64 { 1.0 }
fn default_outer_corr_tolerance() -> f64 { 1e-6 }
fn default_n_outer_corr() -> usize { 30 }
fn default_true() -> bool { true }
fn default_residual_file() -> PathBuf { PathBuf::from("fsiResiduals.dat") }

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            coupling: CouplingScheme::default(),
            relaxation_factor: default_relaxation_factor(),
            relaxation_factor_max: default_relaxation_factor_max(),
            aitken_seed: AitkenSeed::default(),
            outer_corr_tolerance: default_outer_corr_tolerance(),
            n_outer_corr: default_n_outer_corr(),
            predict_solid: true,
            additional_mesh_correction: false,
            mesh_correction_order: MeshCorrectionOrder::default(),
            write_residuals_to_file: true,
            residual_file: default_residual_file(),
            interfaces: Vec::new(),
        }
    }
}

/// 单个耦合界面对配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfacePairConfig {
    /// 界面对名称（用于日志与错误信息）
    pub name: String,
    /// 流体侧界面区域名
    pub fluid_zone: String,
    /// 固体侧界面区域名
    pub solid_zone: String,
    /// 映射方法
    #[serde(default)]
    pub mapping: MapperType,
    /// 直接映射参数
    #[serde(default)]
    pub direct: DirectMapSettings,
    /// RBF 参数
    #[serde(default)]
    pub rbf: RbfSettings,
    /// 重叠插值参数
    #[serde(default)]
    pub overlap: OverlapSettings,
}

impl InterfacePairConfig {
    /// 使用默认映射参数创建界面对
    pub fn new(
        name: impl Into<String>,
        fluid_zone: impl Into<String>,
        solid_zone: impl Into<String>,
        mapping: MapperType,
    ) -> Self {
        Self {
            name: name.into(),
            fluid_zone: fluid_zone.into(),
            solid_zone: solid_zone.into(),
            mapping,
            direct: DirectMapSettings::default(),
            rbf: RbfSettings::default(),
            overlap: OverlapSettings::default(),
        }
    }
}

/// 直接映射参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DirectMapSettings {
    /// 匹配容差（相对于局部最小边长）
    #[serde(default = "default_direct_rel_tol")]
    pub relative_tolerance: f64,
}

fn default_direct_rel_tol() -> f64 { 1e-4 }

impl Default for DirectMapSettings {
    fn default() -> Self {
        Self { relative_tolerance: default_direct_rel_tol() }
    }
}

/// 径向基函数插值参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RbfSettings {
    /// 基函数
    #[serde(default)]
    pub function: RbfFunction,
    /// 支撑半径 / 形状参数，相对于源点云包围盒对角线长度
    #[serde(default = "default_radius_factor")]
    pub radius_factor: f64,
    /// 是否附加常数多项式项（保证常数场精确重构）
    #[serde(default = "default_true")]
    pub constant_term: bool,
}

fn default_radius_factor() -> f64 { 2.0 }

impl Default for RbfSettings {
    fn default() -> Self {
        Self {
            function: RbfFunction::default(),
            radius_factor: default_radius_factor(),
            constant_term: true,
        }
    }
}

/// 重叠插值参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverlapSettings {
    /// 积分守恒检查的相对容差
    #[serde(default = "default_conservation_tolerance")]
    pub conservation_tolerance: f64,
    /// 覆盖率判定容差：覆盖率与 1 相差小于此值时权重归一化为 1
    #[serde(default = "default_coverage_tolerance")]
    pub coverage_tolerance: f64,
    /// 搜索包围盒的扩展量（相对于目标面尺寸）
    #[serde(default = "default_search_expansion")]
    pub search_expansion: f64,
    /// 法向搜索距离（相对于源界面包围盒对角线）
    ///
    /// 两侧界面沿法向分离不超过此距离时仍能找到重叠面。
    #[serde(default = "default_normal_gap_factor")]
    pub normal_gap_factor: f64,
}

fn default_conservation_tolerance() -> f64 { 1e-3 }
fn default_coverage_tolerance() -> f64 { 1e-6 }
fn default_search_expansion() -> f64 { 0.1 }
fn default_normal_gap_factor() -> f64 { 1.0 }

impl Default for OverlapSettings {
    fn default() -> Self {
        Self {
            conservation_tolerance: default_conservation_tolerance(),
            coverage_tolerance: default_coverage_tolerance(),
            search_expansion: default_search_expansion(),
            normal_gap_factor: default_normal_gap_factor(),
        }
    }
}

impl CouplingConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: CouplingConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为格式化 JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.outer_corr_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "outer_corr_tolerance",
                self.outer_corr_tolerance,
                "容差必须为正",
            ));
        }

        if self.n_outer_corr == 0 {
            return Err(ConfigError::invalid("n_outer_corr", self.n_outer_corr, "必须 >= 1"));
        }

        if !(self.relaxation_factor > 0.0 && self.relaxation_factor <= 2.0) {
            return Err(ConfigError::invalid(
                "relaxation_factor",
                self.relaxation_factor,
                "必须在 (0, 2] 范围内",
            ));
        }

        if !(self.relaxation_factor_max > 0.0 && self.relaxation_factor_max <= 2.0) {
            return Err(ConfigError::invalid(
                "relaxation_factor_max",
                self.relaxation_factor_max,
                "必须在 (0, 2] 范围内",
            ));
        }

        if self.write_residuals_to_file && self.residual_file.as_os_str().is_empty() {
            return Err(ConfigError::Missing("residual_file".to_string()));
        }

        if self.interfaces.is_empty() {
            return Err(ConfigError::Missing("interfaces".to_string()));
        }

        let mut names = HashSet::new();
        for pair in &self.interfaces {
            if !names.insert(pair.name.as_str()) {
                return Err(ConfigError::invalid(
                    "interfaces.name",
                    &pair.name,
                    "界面对名称重复",
                ));
            }
            pair.validate()?;
        }

        Ok(())
    }
}

impl InterfacePairConfig {
    /// 验证单个界面对
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fluid_zone.is_empty() {
            return Err(ConfigError::Missing(format!("interfaces[{}].fluid_zone", self.name)));
        }
        if self.solid_zone.is_empty() {
            return Err(ConfigError::Missing(format!("interfaces[{}].solid_zone", self.name)));
        }

        match self.mapping {
            MapperType::DirectMap => {
                if !(self.direct.relative_tolerance > 0.0) {
                    return Err(ConfigError::invalid(
                        format!("interfaces[{}].direct.relative_tolerance", self.name),
                        self.direct.relative_tolerance,
                        "必须为正",
                    ));
                }
            }
            MapperType::Rbf => {
                if !(self.rbf.radius_factor > 0.0) {
                    return Err(ConfigError::invalid(
                        format!("interfaces[{}].rbf.radius_factor", self.name),
                        self.rbf.radius_factor,
                        "必须为正",
                    ));
                }
            }
            MapperType::Overlap => {
                let o = &self.overlap;
                if !(o.conservation_tolerance > 0.0) || !(o.coverage_tolerance >= 0.0) {
                    return Err(ConfigError::invalid(
                        format!("interfaces[{}].overlap", self.name),
                        format!("{:?}", o),
                        "容差必须为非负且守恒容差为正",
                    ));
                }
                if o.search_expansion < 0.0 {
                    return Err(ConfigError::invalid(
                        format!("interfaces[{}].overlap.search_expansion", self.name),
                        o.search_expansion,
                        "必须 >= 0",
                    ));
                }
                if !(o.normal_gap_factor > 0.0) {
                    return Err(ConfigError::invalid(
                        format!("interfaces[{}].overlap.normal_gap_factor", self.name),
                        o.normal_gap_factor,
                        "必须为正",
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal() -> CouplingConfig {
        CouplingConfig {
            interfaces: vec![InterfacePairConfig::new("wall", "fluidWall", "solidWall", MapperType::Rbf)],
            ..Default::default()
        }
    }

    #[test]
    fn test_default_values() {
        let cfg = CouplingConfig::default();
        assert_eq!(cfg.coupling, CouplingScheme::Aitken);
        assert!((cfg.relaxation_factor - 0.01).abs() < 1e-15);
        assert!(cfg.predict_solid);
        assert!(!cfg.additional_mesh_correction);
        assert_eq!(cfg.n_outer_corr, 30);
    }

    #[test]
    fn test_validate_requires_interfaces() {
        let cfg = CouplingConfig::default();
        assert!(matches!(cfg.validate(), Err(ConfigError::Missing(_))));
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_outer_corr() {
        let mut cfg = minimal();
        cfg.n_outer_corr = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("n_outer_corr"));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut cfg = minimal();
        cfg.interfaces.push(cfg.interfaces[0].clone());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_with_defaults() {
        let json = r#"{
            "coupling": "fixedRelaxation",
            "relaxation_factor": 0.1,
            "interfaces": [
                { "name": "plate", "fluid_zone": "f", "solid_zone": "s", "mapping": "overlap" }
            ]
        }"#;
        let cfg = CouplingConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.coupling, CouplingScheme::FixedRelaxation);
        assert_eq!(cfg.interfaces[0].mapping, MapperType::Overlap);
        assert!((cfg.interfaces[0].overlap.conservation_tolerance - 1e-3).abs() < 1e-15);
        assert!((cfg.interfaces[0].overlap.normal_gap_factor - 1.0).abs() < 1e-15);

        let text = cfg.to_json_pretty().unwrap();
        let back = CouplingConfig::from_json_str(&text).unwrap();
        assert_eq!(back.coupling, cfg.coupling);
    }

    #[test]
    fn test_validate_rejects_nonpositive_normal_gap() {
        let mut cfg = minimal();
        cfg.interfaces[0].mapping = MapperType::Overlap;
        cfg.interfaces[0].overlap.normal_gap_factor = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("normal_gap_factor"));
    }

    #[test]
    fn test_unknown_mapper_tag_fails_fast() {
        let json = r#"{ "interfaces": [
            { "name": "plate", "fluid_zone": "f", "solid_zone": "s", "mapping": "kriging" } ] }"#;
        let err = CouplingConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("kriging"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "coupling": "weakCoupling", "interfaces": [
                {{ "name": "a", "fluid_zone": "f", "solid_zone": "s", "mapping": "directMap" }} ] }}"#
        )
        .unwrap();
        let cfg = CouplingConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.coupling, CouplingScheme::WeakCoupling);
    }
}
