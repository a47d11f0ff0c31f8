// crates/fsi_coupling/src/collaborator.rs

//! 求解器协作方接口
//!
//! 耦合层只通过这两个 trait 使用流体与固体求解器，不接触其内部离散。
//! 区域参数 `zone` 是 `interface_zones()` 返回切片中的下标。
//!
//! 每次 `evolve()` 都是阻塞调用，返回时求解已完成；返回 `false`
//! 表示求解失败，耦合层把它作为致命错误上报。

use fsi_foundation::FsiResult;
use fsi_mesh::{DVec3, InterfaceZone};

/// 流体求解器
pub trait FluidCollaborator {
    /// 推进一次流体求解（当前外迭代）
    fn evolve(&mut self) -> bool;

    /// 流体侧界面区域（当前变形构型）
    fn interface_zones(&self) -> &[InterfaceZone];

    /// 界面面上的牵引力
    fn interface_traction(&self, zone: usize) -> Vec<DVec3>;

    /// 按界面点的总位移移动流体网格
    fn move_interface(&mut self, zone: usize, displacement: &[DVec3]) -> FsiResult<()>;

    /// 当前物理时间
    fn time(&self) -> f64;

    /// 当前时间步编号
    fn time_index(&self) -> usize;
}

/// 固体求解器
pub trait SolidCollaborator {
    /// 推进一次固体求解（当前外迭代）
    fn evolve(&mut self) -> bool;

    /// 固体侧界面区域（当前变形构型）
    fn interface_zones(&self) -> &[InterfaceZone];

    /// 界面点的总位移
    fn interface_displacement(&self, zone: usize) -> Vec<DVec3>;

    /// 设置界面面上的牵引力
    fn set_interface_traction(&mut self, zone: usize, traction: &[DVec3]) -> FsiResult<()>;

    /// 把增量量累加到总量（增量型材料格式）
    fn update_total_fields(&mut self);
}
