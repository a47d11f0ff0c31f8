// crates/fsi_foundation/src/metrics.rs
//! 事件计数
//!
//! 映射器的传递统计在 `&self` 下累加（传递接口只借用映射器），
//! 因此计数器用原子整数实现，读数只用于诊断，不参与同步。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 单调递增的事件计数器
///
/// 克隆得到当时读数的快照，此后两者独立计数。
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// 零值
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// 记录一次事件
    #[inline]
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// 已记录的事件数
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        Self(AtomicU64::new(self.get()))
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
