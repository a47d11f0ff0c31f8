// apps/fsi_cli/src/commands/info.rs

//! 信息显示命令

use anyhow::Result;
use clap::Args;
use fsi_config::{CouplingConfig, CouplingScheme, MapperType};
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 只列出可选的耦合策略与映射方法
    #[arg(long)]
    pub tags: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== FSI 信息 ===");

    println!("fsi_cli 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("耦合策略: {}", CouplingScheme::TAGS.join(", "));
    println!("映射方法: {}", MapperType::TAGS.join(", "));

    if !args.tags {
        println!("\n=== 默认配置 ===");
        println!("{}", CouplingConfig::default().to_json_pretty()?);
    }
    Ok(())
}
