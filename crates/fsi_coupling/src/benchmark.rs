// crates/fsi_coupling/src/benchmark.rs

//! 弹簧类比基准算例
//!
//! 一维弹簧类比的耦合系统，可放在任意界面上：
//!
//! - 流体：面牵引力 `t = p_ext - m_a · d_face`，`d_face` 为面各点位移平均
//!   （压力随位移线性变化，`m_a` 相当于附加质量）
//! - 固体：点位移 `d = t_point / k`，`t_point` 为相邻面牵引力平均
//!
//! 不动点 `d* = p_ext / (k + m_a)`，附加质量比 `m_a / k` 决定固定松弛的收敛速度。

use fsi_foundation::{FsiError, FsiResult};
use fsi_mesh::{DVec3, InterfaceZone};

use crate::collaborator::{FluidCollaborator, SolidCollaborator};

fn check_len(name: &str, expected: usize, actual: usize) -> FsiResult<()> {
    if expected != actual {
        return Err(FsiError::size_mismatch(name, expected, actual));
    }
    Ok(())
}

fn displaced(reference: &[DVec3], displacement: &[DVec3]) -> Vec<DVec3> {
    reference
        .iter()
        .zip(displacement)
        .map(|(p, d)| *p + *d)
        .collect()
}

// ============================================================
// 流体
// ============================================================

/// 弹簧类比流体
#[derive(Debug, Clone)]
pub struct SpringFluid {
    zones: Vec<InterfaceZone>,
    reference: Vec<Vec<DVec3>>,
    displacement: Vec<Vec<DVec3>>,
    traction: Vec<Vec<DVec3>>,
    external_traction: DVec3,
    added_mass: f64,
    time: f64,
    time_index: usize,
    evolve_count: usize,
}

impl SpringFluid {
    /// 创建
    ///
    /// - `external_traction`: 零位移时的面牵引力
    /// - `added_mass`: 牵引力对位移的斜率
    pub fn new(zones: Vec<InterfaceZone>, external_traction: DVec3, added_mass: f64) -> Self {
        let reference: Vec<Vec<DVec3>> = zones.iter().map(|z| z.points().to_vec()).collect();
        let displacement = zones.iter().map(|z| vec![DVec3::ZERO; z.n_points()]).collect();
        let traction = zones
            .iter()
            .map(|z| vec![external_traction; z.n_faces()])
            .collect();
        Self {
            zones,
            reference,
            displacement,
            traction,
            external_traction,
            added_mass,
            time: 0.0,
            time_index: 0,
            evolve_count: 0,
        }
    }

    /// 推进时间
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
        self.time_index += 1;
    }

    /// 设置外载
    pub fn set_external_traction(&mut self, traction: DVec3) {
        self.external_traction = traction;
    }

    /// 当前界面点位移
    pub fn displacement(&self, zone: usize) -> &[DVec3] {
        &self.displacement[zone]
    }

    /// evolve 调用次数
    pub fn evolve_count(&self) -> usize {
        self.evolve_count
    }
}

impl FluidCollaborator for SpringFluid {
    fn evolve(&mut self) -> bool {
        self.evolve_count += 1;
        for (z, zone) in self.zones.iter().enumerate() {
            let d = &self.displacement[z];
            self.traction[z] = (0..zone.n_faces())
                .map(|f| {
                    let idx = zone.face_point_indices(f);
                    let d_face =
                        idx.iter().map(|&p| d[p as usize]).sum::<DVec3>() / idx.len() as f64;
                    self.external_traction - d_face * self.added_mass
                })
                .collect();
        }
        true
    }

    fn interface_zones(&self) -> &[InterfaceZone] {
        &self.zones
    }

    fn interface_traction(&self, zone: usize) -> Vec<DVec3> {
        self.traction[zone].clone()
    }

    fn move_interface(&mut self, zone: usize, displacement: &[DVec3]) -> FsiResult<()> {
        check_len("fluid.displacement", self.zones[zone].n_points(), displacement.len())?;
        self.displacement[zone] = displacement.to_vec();
        self.zones[zone].set_points(displaced(&self.reference[zone], displacement))?;
        Ok(())
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn time_index(&self) -> usize {
        self.time_index
    }
}

// ============================================================
// 固体
// ============================================================

/// 弹簧类比固体
#[derive(Debug, Clone)]
pub struct SpringSolid {
    zones: Vec<InterfaceZone>,
    reference: Vec<Vec<DVec3>>,
    stiffness: Vec<Vec<f64>>,
    traction: Vec<Vec<DVec3>>,
    displacement: Vec<Vec<DVec3>>,
    total_displacement: Vec<Vec<DVec3>>,
    evolve_count: usize,
}

impl SpringSolid {
    /// 创建，所有点刚度相同
    pub fn new(zones: Vec<InterfaceZone>, stiffness: f64) -> Self {
        Self::with_stiffness_fn(zones, |_| stiffness)
    }

    /// 按点位置给定刚度
    pub fn with_stiffness_fn(zones: Vec<InterfaceZone>, stiffness: impl Fn(DVec3) -> f64) -> Self {
        let reference: Vec<Vec<DVec3>> = zones.iter().map(|z| z.points().to_vec()).collect();
        let stiffness = reference
            .iter()
            .map(|pts| pts.iter().map(|p| stiffness(*p)).collect())
            .collect();
        let traction = zones.iter().map(|z| vec![DVec3::ZERO; z.n_faces()]).collect();
        let displacement: Vec<Vec<DVec3>> =
            zones.iter().map(|z| vec![DVec3::ZERO; z.n_points()]).collect();
        Self {
            zones,
            reference,
            stiffness,
            traction,
            total_displacement: displacement.clone(),
            displacement,
            evolve_count: 0,
        }
    }

    /// 最近一次 `update_total_fields` 时的位移
    pub fn total_displacement(&self, zone: usize) -> &[DVec3] {
        &self.total_displacement[zone]
    }

    /// evolve 调用次数
    pub fn evolve_count(&self) -> usize {
        self.evolve_count
    }
}

impl SolidCollaborator for SpringSolid {
    fn evolve(&mut self) -> bool {
        self.evolve_count += 1;
        for z in 0..self.zones.len() {
            let point_traction = match self.zones[z].face_to_point_average(&self.traction[z]) {
                Ok(t) => t,
                Err(_) => return false,
            };
            self.displacement[z] = point_traction
                .iter()
                .zip(&self.stiffness[z])
                .map(|(t, k)| *t / *k)
                .collect();
            let points = displaced(&self.reference[z], &self.displacement[z]);
            if self.zones[z].set_points(points).is_err() {
                return false;
            }
        }
        true
    }

    fn interface_zones(&self) -> &[InterfaceZone] {
        &self.zones
    }

    fn interface_displacement(&self, zone: usize) -> Vec<DVec3> {
        self.displacement[zone].clone()
    }

    fn set_interface_traction(&mut self, zone: usize, traction: &[DVec3]) -> FsiResult<()> {
        check_len("solid.traction", self.zones[zone].n_faces(), traction.len())?;
        self.traction[zone] = traction.to_vec();
        Ok(())
    }

    fn update_total_fields(&mut self) {
        self.total_displacement = self.displacement.clone();
    }
}
