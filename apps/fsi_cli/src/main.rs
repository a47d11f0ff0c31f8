// apps/fsi_cli/src/main.rs

//! fsi_cli：分区流固耦合驱动
//!
//! 三个子命令：`run` 在生成的平面界面上推进弹簧类比耦合，`validate` 校验
//! JSON 配置，`info` 打印默认配置。各库 crate 经 `log` 输出的记录由这里
//! 安装的 tracing 订阅器统一接收。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "fsi_cli", version, about = "Partitioned fluid-structure interaction coupling driver")]
struct Cli {
    /// 最低日志级别：trace / debug / info / warn / error
    #[arg(short, long, default_value = "info", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 在平面界面上运行弹簧类比耦合
    Run(commands::run::RunArgs),
    /// 打印默认耦合配置
    Info(commands::info::InfoArgs),
    /// 校验耦合配置文件
    Validate(commands::validate::ValidateArgs),
}

fn init_logging(level: Level) -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish()
        .try_init()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        let cli = Cli::try_parse_from(["fsi_cli", "-l", "debug", "info"]).unwrap();
        assert_eq!(cli.log_level, Level::DEBUG);

        let cli = Cli::try_parse_from(["fsi_cli", "info"]).unwrap();
        assert_eq!(cli.log_level, Level::INFO);

        assert!(Cli::try_parse_from(["fsi_cli", "--log-level", "loud", "info"]).is_err());
    }
}
