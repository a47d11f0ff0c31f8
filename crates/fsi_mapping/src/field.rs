// crates/fsi_mapping/src/field.rs

//! 界面场的值类型与场位置

use std::fmt;
use std::ops::{Add, Mul};

use glam::DVec3;

/// 场位置：面或点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLocation {
    /// 面心量
    Faces,
    /// 点量
    Points,
}

impl FieldLocation {
    /// 简短标签
    pub fn tag(self) -> &'static str {
        match self {
            Self::Faces => "faces",
            Self::Points => "points",
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Faces => write!(f, "面"),
            Self::Points => write!(f, "点"),
        }
    }
}

/// 可被映射的场值
///
/// 映射只做线性组合，因此只需要零元、加法与数乘。
pub trait FieldValue: Copy + Send + Sync + Add<Output = Self> + Mul<f64, Output = Self> {
    /// 零值
    fn zero() -> Self;

    /// 转为三维矢量（标量放在 x 分量），用于积分量比较
    fn as_vector(self) -> DVec3;
}

impl FieldValue for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn as_vector(self) -> DVec3 {
        DVec3::new(self, 0.0, 0.0)
    }
}

impl FieldValue for DVec3 {
    #[inline]
    fn zero() -> Self {
        DVec3::ZERO
    }

    #[inline]
    fn as_vector(self) -> DVec3 {
        self
    }
}

/// 面积加权积分 Σ |Aᵢ| vᵢ
pub fn area_integral<T: FieldValue>(areas: &[f64], values: &[T]) -> DVec3 {
    areas
        .iter()
        .zip(values)
        .map(|(a, v)| v.as_vector() * *a)
        .sum()
}
