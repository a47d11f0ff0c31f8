// crates/fsi_foundation/src/lib.rs

//! 流固耦合基础层
//!
//! 零业务依赖的基础层，为上层 crate 提供共同抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `FsiError` / `FsiResult`
//! - [`metrics`]: 无锁计数器，用于警告与迭代统计
//!
//! # 示例
//!
//! ```
//! use fsi_foundation::{FsiError, FsiResult};
//!
//! fn check(n: usize) -> FsiResult<()> {
//!     if n == 0 {
//!         return Err(FsiError::invalid_input("界面点数不能为零"));
//!     }
//!     Ok(())
//! }
//! assert!(check(0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod metrics;

pub use error::{FsiError, FsiResult};
pub use metrics::Counter;

/// 极小量，用于除零保护
pub const SMALL: f64 = 1e-15;

/// 极小量的平方量级，用于范数平方的判零
pub const VSMALL: f64 = 1e-300;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{FsiError, FsiResult};
    pub use crate::metrics::Counter;
    pub use crate::{SMALL, VSMALL};
}
