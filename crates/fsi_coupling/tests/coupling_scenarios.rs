// crates/fsi_coupling/tests/coupling_scenarios.rs

//! 耦合场景测试
//!
//! 弹簧类比系统：流体牵引力 t = p - m·d，固体位移 d = t / k。
//! 附加质量比 m / k = 0.5 时固定松弛 0.1 的误差收缩率为 0.85，
//! 而 Aitken 在标量问题上两次外迭代即得到最优因子 1 / 1.5。

use fsi_config::{
    AitkenSeed, CouplingConfig, CouplingScheme, InterfacePairConfig, MapperType,
    MeshCorrectionOrder,
};
use fsi_coupling::benchmark::{SpringFluid, SpringSolid};
use fsi_coupling::{
    CouplingError, CouplingInterface, CouplingStatus, FluidCollaborator, SolidCollaborator,
};
use fsi_foundation::FsiResult;
use fsi_mesh::generation::RectZoneGenerator;
use fsi_mesh::{DVec3, InterfaceZone};

const PRESSURE: f64 = -1.0e3;
const ADDED_MASS: f64 = 5.0e4;
const STIFFNESS: f64 = 1.0e5;

fn config(scheme: CouplingScheme, mapping: MapperType) -> CouplingConfig {
    CouplingConfig {
        coupling: scheme,
        relaxation_factor: 0.1,
        relaxation_factor_max: 1.0,
        outer_corr_tolerance: 1e-6,
        n_outer_corr: 100,
        write_residuals_to_file: false,
        interfaces: vec![InterfacePairConfig::new(
            "wall",
            "fluidWall",
            "solidWall",
            mapping,
        )],
        ..CouplingConfig::default()
    }
}

fn conformal_zones() -> (InterfaceZone, InterfaceZone) {
    (
        RectZoneGenerator::new(4, 4, 1.0, 1.0).build("fluidWall").unwrap(),
        RectZoneGenerator::new(4, 4, 1.0, 1.0)
            .flipped()
            .build("solidWall")
            .unwrap(),
    )
}

fn spring_system(config: CouplingConfig) -> CouplingInterface<SpringFluid, SpringSolid> {
    let (f, s) = conformal_zones();
    let fluid = SpringFluid::new(vec![f], DVec3::new(0.0, 0.0, PRESSURE), ADDED_MASS);
    let solid = SpringSolid::new(vec![s], STIFFNESS);
    CouplingInterface::new(config, fluid, solid).unwrap()
}

fn exact_displacement() -> f64 {
    PRESSURE / (STIFFNESS + ADDED_MASS)
}

// ============================================================
// 弹簧类比端到端
// ============================================================

#[test]
fn test_spring_aitken_versus_fixed() {
    let mut aitken = spring_system(config(CouplingScheme::Aitken, MapperType::DirectMap));
    let mut fixed = spring_system(config(CouplingScheme::FixedRelaxation, MapperType::DirectMap));

    let a = aitken.evolve().unwrap();
    let f = fixed.evolve().unwrap();

    assert_eq!(a.status, CouplingStatus::Converged);
    assert!(a.residual_norm < 1e-6);
    assert!(a.iterations <= 6, "Aitken 外迭代 {}", a.iterations);

    assert_eq!(f.status, CouplingStatus::Converged);
    assert!(f.iterations >= 30, "固定松弛外迭代 {}", f.iterations);
    assert!(a.iterations < f.iterations);

    let d = exact_displacement();
    for p in aitken.estimate(0) {
        assert!((p.z - d).abs() < 1e-6);
    }
    for v in fixed.solid().interface_displacement(0) {
        assert!((v.z - d).abs() < 1e-5);
    }
}

#[test]
fn test_spring_without_predictor() {
    let mut cfg = config(CouplingScheme::Aitken, MapperType::DirectMap);
    cfg.predict_solid = false;
    let mut fsi = spring_system(cfg);
    let report = fsi.evolve().unwrap();
    assert!(report.is_converged());
    assert!(report.iterations <= 6);
    // 不做预测时固体只在外迭代中求解
    assert_eq!(fsi.solid().evolve_count(), report.iterations);
    assert_eq!(fsi.fluid().evolve_count(), report.iterations);
}

#[test]
fn test_spring_on_non_matching_overlap_interface() {
    let fluid_zone = RectZoneGenerator::new(6, 6, 1.0, 1.0).build("fluidWall").unwrap();
    let solid_zone = RectZoneGenerator::new(4, 4, 1.0, 1.0)
        .triangulated()
        .flipped()
        .build("solidWall")
        .unwrap();
    let fluid = SpringFluid::new(vec![fluid_zone], DVec3::new(0.0, 0.0, PRESSURE), ADDED_MASS);
    let solid = SpringSolid::new(vec![solid_zone], STIFFNESS);
    let mut fsi =
        CouplingInterface::new(config(CouplingScheme::Aitken, MapperType::Overlap), fluid, solid)
            .unwrap();

    let report = fsi.evolve().unwrap();
    assert!(report.is_converged());
    assert!(report.iterations <= 6);
    assert_eq!(fsi.diagnostics().conservation_warnings, 0);
    for p in fsi.estimate(0) {
        assert!((p.z - exact_displacement()).abs() < 1e-6);
    }
}

#[test]
fn test_direct_map_addressing_built_before_motion() {
    let mut fsi = spring_system(config(CouplingScheme::Aitken, MapperType::DirectMap));
    // 面与点两张地址表，反方向为逆置换
    assert_eq!(fsi.mapper(0).stats().operator_builds.get(), 2);

    for step in 1..=3 {
        fsi.fluid_mut().advance(0.1);
        let report = fsi.evolve().unwrap();
        assert!(report.is_converged(), "第 {step} 步: {:?}", report.status);
    }
    assert_eq!(fsi.mapper(0).stats().operator_builds.get(), 2);
    for p in fsi.estimate(0) {
        assert!((p.z - exact_displacement()).abs() < 1e-6);
    }
}

#[test]
fn test_overlap_coupling_large_displacement() {
    // 位移与界面尺寸同量级，两侧界面在外迭代中沿法向明显分离
    let pressure = -1.0e5;
    let fluid_zone = RectZoneGenerator::new(6, 6, 1.0, 1.0).build("fluidWall").unwrap();
    let solid_zone = RectZoneGenerator::new(4, 4, 1.0, 1.0)
        .triangulated()
        .flipped()
        .build("solidWall")
        .unwrap();
    let fluid = SpringFluid::new(vec![fluid_zone], DVec3::new(0.0, 0.0, pressure), ADDED_MASS);
    let solid = SpringSolid::new(vec![solid_zone], STIFFNESS);
    let mut fsi =
        CouplingInterface::new(config(CouplingScheme::Aitken, MapperType::Overlap), fluid, solid)
            .unwrap();

    let report = fsi.evolve().unwrap();
    assert_eq!(report.status, CouplingStatus::Converged);
    assert!(report.iterations <= 6, "外迭代 {}", report.iterations);
    assert_eq!(fsi.diagnostics().conservation_warnings, 0);

    let d = pressure / (STIFFNESS + ADDED_MASS);
    for p in fsi.estimate(0) {
        assert!((p.z - d).abs() < 1e-6, "{} != {}", p.z, d);
    }
}

// ============================================================
// Aitken 单调性
// ============================================================

fn graded_system(scheme: CouplingScheme) -> CouplingInterface<SpringFluid, SpringSolid> {
    let f = RectZoneGenerator::new(4, 1, 4.0, 1.0).build("fluidWall").unwrap();
    let s = RectZoneGenerator::new(4, 1, 4.0, 1.0).build("solidWall").unwrap();
    let fluid = SpringFluid::new(vec![f], DVec3::new(0.0, 0.0, PRESSURE), ADDED_MASS);
    let solid = SpringSolid::with_stiffness_fn(vec![s], |p| STIFFNESS * (1.0 + 0.5 * p.x));
    CouplingInterface::new(config(scheme, MapperType::DirectMap), fluid, solid).unwrap()
}

#[test]
fn test_aitken_monotone_and_faster_than_fixed() {
    let mut aitken = graded_system(CouplingScheme::Aitken);
    let mut fixed = graded_system(CouplingScheme::FixedRelaxation);

    let a = aitken.evolve().unwrap();
    let f = fixed.evolve().unwrap();
    assert!(a.is_converged());
    assert!(f.is_converged());
    assert!(a.iterations < f.iterations);

    let norms: Vec<f64> = aitken
        .convergence_log()
        .records()
        .iter()
        .map(|r| r.residual)
        .collect();
    assert_eq!(norms.len(), a.iterations);
    for w in norms.windows(2).skip(1) {
        assert!(w[1] <= w[0], "残差序列 {:?}", norms);
    }
}

// ============================================================
// 终止与残差
// ============================================================

#[test]
fn test_iteration_cap_terminates() {
    let mut cfg = config(CouplingScheme::FixedRelaxation, MapperType::DirectMap);
    cfg.n_outer_corr = 3;
    let mut fsi = spring_system(cfg);

    for step in 1..=3 {
        fsi.fluid_mut().advance(0.1);
        let report = fsi.evolve().unwrap();
        assert_eq!(report.status, CouplingStatus::MaxIterationsReached);
        assert_eq!(report.iterations, 3);
        assert_eq!(fsi.status(), CouplingStatus::MaxIterationsReached);
        assert_eq!(fsi.diagnostics().max_iterations_reached, step);
    }

    let diag = fsi.finish().unwrap();
    assert_eq!(diag.steps, 3);
    assert_eq!(diag.total_outer_iterations, 9);
    assert_eq!(fsi.convergence_log().records().len(), 9);
}

#[test]
fn test_weak_coupling_single_pass() {
    let mut cfg = config(CouplingScheme::WeakCoupling, MapperType::DirectMap);
    cfg.predict_solid = false;
    let mut fsi = spring_system(cfg);

    let first = fsi.evolve().unwrap();
    assert_eq!(first.iterations, 1);
    let lagged = fsi.solid().interface_displacement(0);

    // 第二步流体移动到固体上一步的位置
    fsi.fluid_mut().advance(0.1);
    let second = fsi.evolve().unwrap();
    assert_eq!(second.iterations, 1);
    for (e, d) in fsi.estimate(0).iter().zip(&lagged) {
        assert!((*e - *d).length() < 1e-15);
    }

    // 弱耦合不计入收敛警告
    assert_eq!(fsi.diagnostics().max_iterations_reached, 0);
    assert_eq!(fsi.diagnostics().steps, 2);
}

#[test]
fn test_residual_is_new_minus_imposed() {
    let mut cfg = config(CouplingScheme::FixedRelaxation, MapperType::DirectMap);
    cfg.n_outer_corr = 2;
    let mut fsi = spring_system(cfg);
    fsi.evolve().unwrap();

    let imposed = fsi.estimate(0).to_vec();
    let new = fsi.solid().interface_displacement(0);
    let recorded = fsi.residual(0).to_vec();

    for i in 0..imposed.len() {
        assert_eq!(recorded[i], new[i] - imposed[i]);
        let rebuilt = imposed[i] + recorded[i];
        assert!((rebuilt - new[i]).length() <= 1e-15 * new[i].length().max(1.0));
    }

    let rms = (recorded.iter().map(|r| r.length_squared()).sum::<f64>() / recorded.len() as f64)
        .sqrt();
    let last = fsi.convergence_log().records().last().unwrap();
    assert!((last.residual - rms).abs() <= 1e-15 * rms.max(1.0));
}

// ============================================================
// 附加网格修正
// ============================================================

#[test]
fn test_additional_mesh_correction_orders() {
    for order in [
        MeshCorrectionOrder::AfterTotalFields,
        MeshCorrectionOrder::BeforeTotalFields,
    ] {
        let mut cfg = config(CouplingScheme::FixedRelaxation, MapperType::DirectMap);
        cfg.n_outer_corr = 2;
        cfg.additional_mesh_correction = true;
        cfg.mesh_correction_order = order;
        let mut fsi = spring_system(cfg);

        let report = fsi.evolve().unwrap();
        assert_eq!(report.status, CouplingStatus::MaxIterationsReached);

        let solid_d = fsi.solid().interface_displacement(0);
        for (e, d) in fsi.estimate(0).iter().zip(&solid_d) {
            assert!((*e - *d).length() < 1e-15);
        }
        assert!(fsi.residual(0).iter().all(|r| *r == DVec3::ZERO));
        assert_eq!(fsi.solid().total_displacement(0), solid_d.as_slice());
        // 修正不计入外迭代
        assert_eq!(fsi.convergence_log().records().len(), 2);
    }
}

// ============================================================
// 收敛记录文件
// ============================================================

#[test]
fn test_convergence_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fsiResiduals.dat");

    let mut cfg = config(CouplingScheme::Aitken, MapperType::DirectMap);
    cfg.write_residuals_to_file = true;
    cfg.residual_file = path.clone();
    let mut fsi = spring_system(cfg);

    fsi.fluid_mut().advance(0.5);
    let first = fsi.evolve().unwrap();
    fsi.fluid_mut().advance(0.5);
    let second = fsi.evolve().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), first.iterations + second.iterations);

    for (line, record) in lines.iter().zip(fsi.convergence_log().records()) {
        let cols: Vec<&str> = line.split(' ').collect();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].parse::<f64>().unwrap(), record.time);
        assert_eq!(cols[1].parse::<usize>().unwrap(), record.iteration);
        assert_eq!(*line, format!("{} {} {:.6e}", record.time, record.iteration, record.residual));
    }
    assert!(lines[0].starts_with("0.5 1 "));
    assert!(lines[first.iterations].starts_with("1 1 "));
}

// ============================================================
// 错误
// ============================================================

#[test]
fn test_unknown_zone() {
    let mut cfg = config(CouplingScheme::Aitken, MapperType::DirectMap);
    cfg.interfaces[0].solid_zone = "beam".into();
    let (f, s) = conformal_zones();
    let err = CouplingInterface::new(
        cfg,
        SpringFluid::new(vec![f], DVec3::ZERO, ADDED_MASS),
        SpringSolid::new(vec![s], STIFFNESS),
    )
    .err()
    .unwrap();
    assert!(matches!(err, CouplingError::UnknownZone { side: "solid", .. }));
}

#[test]
fn test_zone_count_mismatch() {
    let mut cfg = config(CouplingScheme::Aitken, MapperType::DirectMap);
    cfg.interfaces
        .push(InterfacePairConfig::new("top", "fluidTop", "solidTop", MapperType::Rbf));
    let (f, s) = conformal_zones();
    let err = CouplingInterface::new(
        cfg,
        SpringFluid::new(vec![f], DVec3::ZERO, ADDED_MASS),
        SpringSolid::new(vec![s], STIFFNESS),
    )
    .err()
    .unwrap();
    assert!(matches!(err, CouplingError::ZoneCountMismatch { pairs: 2, .. }));
}

#[test]
fn test_invalid_config_rejected_before_stepping() {
    let mut cfg = config(CouplingScheme::Aitken, MapperType::DirectMap);
    cfg.n_outer_corr = 0;
    let (f, s) = conformal_zones();
    let err = CouplingInterface::new(
        cfg,
        SpringFluid::new(vec![f], DVec3::ZERO, ADDED_MASS),
        SpringSolid::new(vec![s], STIFFNESS),
    )
    .err()
    .unwrap();
    assert!(matches!(err, CouplingError::Config(_)));
}

#[test]
fn test_direct_map_mismatch_names_pair() {
    let f = RectZoneGenerator::new(4, 4, 1.0, 1.0).build("fluidWall").unwrap();
    let s = RectZoneGenerator::new(3, 3, 1.0, 1.0).build("solidWall").unwrap();
    let err = CouplingInterface::new(
        config(CouplingScheme::Aitken, MapperType::DirectMap),
        SpringFluid::new(vec![f], DVec3::new(0.0, 0.0, PRESSURE), ADDED_MASS),
        SpringSolid::new(vec![s], STIFFNESS),
    )
    .err()
    .unwrap();

    // 地址表在构造时建立，不匹配在第一个时间步之前暴露
    match &err {
        CouplingError::Mapping { pair, mapper, source } => {
            assert_eq!(pair, "wall");
            assert_eq!(*mapper, "directMap");
            assert!(source.is_geometry_mismatch());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("wall"));
}

/// evolve 总是失败的流体
struct BrokenFluid(SpringFluid);

impl FluidCollaborator for BrokenFluid {
    fn evolve(&mut self) -> bool {
        false
    }
    fn interface_zones(&self) -> &[InterfaceZone] {
        self.0.interface_zones()
    }
    fn interface_traction(&self, zone: usize) -> Vec<DVec3> {
        self.0.interface_traction(zone)
    }
    fn move_interface(&mut self, zone: usize, displacement: &[DVec3]) -> FsiResult<()> {
        self.0.move_interface(zone, displacement)
    }
    fn time(&self) -> f64 {
        self.0.time()
    }
    fn time_index(&self) -> usize {
        self.0.time_index()
    }
}

#[test]
fn test_fluid_failure_is_fatal() {
    let (f, s) = conformal_zones();
    let mut fsi = CouplingInterface::new(
        config(CouplingScheme::Aitken, MapperType::DirectMap),
        BrokenFluid(SpringFluid::new(vec![f], DVec3::ZERO, ADDED_MASS)),
        SpringSolid::new(vec![s], STIFFNESS),
    )
    .unwrap();
    let err = fsi.evolve().unwrap_err();
    assert!(matches!(err, CouplingError::Collaborator { which: "fluid", .. }));
}

#[test]
fn test_aitken_seed_previous_step() {
    let mut cfg = config(CouplingScheme::Aitken, MapperType::DirectMap);
    cfg.aitken_seed = AitkenSeed::PreviousStep;
    let mut fsi = spring_system(cfg);

    let first = fsi.evolve().unwrap();
    assert!((first.relaxation_factors[0] - 1.0 / 1.5).abs() < 1e-9);

    // 外载改变后沿用上一步的因子
    fsi.fluid_mut().set_external_traction(DVec3::new(0.0, 0.0, 2.0 * PRESSURE));
    fsi.fluid_mut().advance(0.1);
    let second = fsi.evolve().unwrap();
    assert!(second.is_converged());
    assert!(second.iterations <= first.iterations);
    for p in fsi.estimate(0) {
        assert!((p.z - 2.0 * exact_displacement()).abs() < 1e-6);
    }
}
