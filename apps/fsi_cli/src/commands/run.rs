// apps/fsi_cli/src/commands/run.rs

//! 运行弹簧类比耦合算例
//!
//! 按配置中的每个界面对生成一块流体平面与一块固体平面（两侧可以不同加密），
//! 用弹簧类比的流体与固体连接耦合界面，推进若干时间步并输出诊断。

use anyhow::{bail, Context, Result};
use clap::Args;
use fsi_config::CouplingConfig;
use fsi_coupling::benchmark::{SpringFluid, SpringSolid};
use fsi_coupling::CouplingInterface;
use fsi_mesh::generation::RectZoneGenerator;
use fsi_mesh::DVec3;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 时间步数
    #[arg(short = 'n', long, default_value = "10")]
    pub steps: usize,

    /// 时间步长 [秒]
    #[arg(long, default_value = "0.01")]
    pub dt: f64,

    /// 界面边长 [m]
    #[arg(long, default_value = "1.0")]
    pub size: f64,

    /// 流体界面每边单元数
    #[arg(long, default_value = "8")]
    pub fluid_cells: usize,

    /// 固体界面每边单元数
    #[arg(long, default_value = "8")]
    pub solid_cells: usize,

    /// 固体界面使用三角形面
    #[arg(long)]
    pub triangulate_solid: bool,

    /// 法向外载 [Pa]
    #[arg(long, default_value = "-1000.0")]
    pub pressure: f64,

    /// 附加质量系数 [Pa/m]
    #[arg(long, default_value = "5.0e4")]
    pub added_mass: f64,

    /// 固体弹簧刚度 [Pa/m]
    #[arg(long, default_value = "1.0e5")]
    pub stiffness: f64,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== FSI 弹簧类比算例 ===");

    if args.steps == 0 {
        bail!("时间步数必须 >= 1");
    }
    if !(args.dt > 0.0) {
        bail!("时间步长必须为正: {}", args.dt);
    }
    if !(args.stiffness > 0.0) {
        bail!("弹簧刚度必须为正: {}", args.stiffness);
    }

    let config = CouplingConfig::from_file(&args.config)
        .with_context(|| format!("加载配置失败: {}", args.config.display()))?;

    let mut fluid_zones = Vec::with_capacity(config.interfaces.len());
    let mut solid_zones = Vec::with_capacity(config.interfaces.len());
    for (i, pair) in config.interfaces.iter().enumerate() {
        let origin = DVec3::new(2.0 * args.size * i as f64, 0.0, 0.0);

        let fluid = RectZoneGenerator::new(args.fluid_cells, args.fluid_cells, args.size, args.size)
            .with_origin(origin)
            .build(&pair.fluid_zone)?;

        let mut solid_gen =
            RectZoneGenerator::new(args.solid_cells, args.solid_cells, args.size, args.size)
                .with_origin(origin)
                .flipped();
        if args.triangulate_solid {
            solid_gen = solid_gen.triangulated();
        }
        let solid = solid_gen.build(&pair.solid_zone)?;

        info!(
            "界面对 '{}': 流体 {} 面 / {} 点, 固体 {} 面 / {} 点, 映射 {}",
            pair.name,
            fluid.n_faces(),
            fluid.n_points(),
            solid.n_faces(),
            solid.n_points(),
            pair.mapping.tag()
        );
        fluid_zones.push(fluid);
        solid_zones.push(solid);
    }

    let fluid = SpringFluid::new(
        fluid_zones,
        DVec3::new(0.0, 0.0, args.pressure),
        args.added_mass,
    );
    let solid = SpringSolid::new(solid_zones, args.stiffness);
    let mut fsi = CouplingInterface::new(config, fluid, solid).context("创建耦合界面失败")?;

    let start = Instant::now();
    for _ in 0..args.steps {
        fsi.fluid_mut().advance(args.dt);
        let report = fsi.evolve()?;
        if !report.is_converged() {
            warn!(
                "t={:.4} s: {} 次外迭代后未收敛, 残差 {:.3e}",
                report.time, report.iterations, report.residual_norm
            );
        }
    }
    let elapsed = start.elapsed();

    let diagnostics = fsi.finish()?;
    let exact = args.pressure / (args.stiffness + args.added_mass);

    println!("\n=== 运行结果 ===");
    println!("时间步: {}", diagnostics.steps);
    println!("收敛步: {}", diagnostics.converged_steps);
    println!("达到外迭代上限: {}", diagnostics.max_iterations_reached);
    println!("平均外迭代: {:.2}", diagnostics.mean_iterations());
    println!("最大残差: {:.3e}", diagnostics.worst_residual);
    println!("守恒警告: {}", diagnostics.conservation_warnings);
    for i in 0..fsi.n_pairs() {
        let estimate = fsi.estimate(i);
        let mean_z = estimate.iter().map(|d| d.z).sum::<f64>() / estimate.len().max(1) as f64;
        println!(
            "界面对 {}: 平均法向位移 {:.6e} m (解析解 {:.6e} m)",
            i, mean_z, exact
        );
    }
    println!("耗时: {:.3} s", elapsed.as_secs_f64());

    Ok(())
}
