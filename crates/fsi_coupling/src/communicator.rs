// crates/fsi_coupling/src/communicator.rs

//! 并行通信协作方
//!
//! 界面区域是全局（收集后）的快照，映射本身不需要通信；但每次移动流体网格前，
//! 位移估计必须由主进程广播，保证各分区使用一致的值。

use fsi_mesh::DVec3;

/// 通信接口
pub trait Communicator: Send {
    /// 当前进程编号
    fn rank(&self) -> usize;

    /// 进程总数
    fn size(&self) -> usize;

    /// 是否为主进程
    fn is_master(&self) -> bool {
        self.rank() == 0
    }

    /// 从主进程广播，返回后各进程 `data` 一致
    fn broadcast(&self, data: &mut [DVec3]);
}

/// 串行通信器（单进程）
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast(&self, _data: &mut [DVec3]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial() {
        let comm = SerialCommunicator;
        assert!(comm.is_master());
        assert_eq!(comm.size(), 1);
        let mut data = [DVec3::X];
        comm.broadcast(&mut data);
        assert_eq!(data[0], DVec3::X);
    }
}
