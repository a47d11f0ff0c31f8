// apps/fsi_cli/src/commands/validate.rs

//! 配置验证命令

use anyhow::{bail, Result};
use clap::Args;
use fsi_config::{CouplingConfig, CouplingScheme, MapperType};
use std::path::PathBuf;
use tracing::{error, info};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== FSI 配置验证 ===");
    println!("检查配置文件: {}", args.config.display());

    let config = match CouplingConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("配置无效: {}", e);
            println!("  ✗ {}", e);
            bail!("配置验证失败");
        }
    };
    println!("  ✓ 配置有效: {} 个界面对", config.interfaces.len());

    let warnings = collect_warnings(&config);
    for w in &warnings {
        println!("  ⚠ {}", w);
    }

    if args.strict && !warnings.is_empty() {
        bail!("严格模式: {} 个警告", warnings.len());
    }
    Ok(())
}

fn collect_warnings(config: &CouplingConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.coupling == CouplingScheme::FixedRelaxation && config.relaxation_factor > 1.0 {
        warnings.push(format!(
            "固定松弛因子 {} > 1, 强附加质量问题可能发散",
            config.relaxation_factor
        ));
    }
    if config.coupling == CouplingScheme::WeakCoupling && config.n_outer_corr > 1 {
        warnings.push("弱耦合只做一次外迭代, n_outer_corr 将被忽略".to_string());
    }
    if config.outer_corr_tolerance > 1e-3 {
        warnings.push(format!("外迭代容差 {:.1e} 偏大", config.outer_corr_tolerance));
    }
    for pair in &config.interfaces {
        if pair.fluid_zone == pair.solid_zone {
            warnings.push(format!("界面对 '{}' 两侧区域同名", pair.name));
        }
        if pair.mapping == MapperType::Rbf && pair.rbf.radius_factor > 1.0 {
            warnings.push(format!(
                "界面对 '{}' 的 RBF 支撑半径系数 {} > 1, 插值矩阵趋于稠密",
                pair.name, pair.rbf.radius_factor
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_config::InterfacePairConfig;

    #[test]
    fn test_warnings() {
        let mut config = CouplingConfig {
            interfaces: vec![InterfacePairConfig::new("wall", "w", "w", MapperType::DirectMap)],
            ..CouplingConfig::default()
        };
        assert_eq!(collect_warnings(&config).len(), 1);

        config.coupling = CouplingScheme::WeakCoupling;
        config.interfaces[0].solid_zone = "s".into();
        assert_eq!(collect_warnings(&config).len(), 1);
    }
}
