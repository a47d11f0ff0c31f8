// crates/fsi_mesh/src/error.rs
//! 界面网格错误类型
//!
//! 所有错误可转换为 `fsi_foundation::FsiError` 向上传播

use fsi_foundation::FsiError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 面的顶点数不足
    #[error("界面 '{zone}' 的面 {face} 只有 {n_points} 个顶点（至少需要 3 个）")]
    FaceTooSmall {
        /// 界面名
        zone: String,
        /// 面编号
        face: usize,
        /// 顶点数
        n_points: usize,
    },

    /// 面引用了不存在的点
    #[error("界面 '{zone}' 的面 {face} 引用了点 {point}，但只有 {n_points} 个点")]
    PointOutOfRange {
        /// 界面名
        zone: String,
        /// 面编号
        face: usize,
        /// 越界的点编号
        point: usize,
        /// 点总数
        n_points: usize,
    },

    /// 退化面（面积为零）
    #[error("界面 '{zone}' 的面 {face} 退化（面积 {area:e}）")]
    DegenerateFace {
        /// 界面名
        zone: String,
        /// 面编号
        face: usize,
        /// 面积
        area: f64,
    },

    /// 点数量不匹配
    #[error("界面 '{zone}' 点数量不匹配: 期望 {expected}, 实际 {actual}")]
    PointCountMismatch {
        /// 界面名
        zone: String,
        /// 期望值
        expected: usize,
        /// 实际值
        actual: usize,
    },

    /// 生成参数无效
    #[error("网格生成参数无效: {0}")]
    InvalidGeneration(String),
}

impl From<MeshError> for FsiError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::PointCountMismatch { zone, expected, actual } => {
                FsiError::size_mismatch(format!("{zone}.points"), expected, actual)
            }
            other => FsiError::invalid_mesh(other.to_string()),
        }
    }
}
