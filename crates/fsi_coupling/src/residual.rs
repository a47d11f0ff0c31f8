// crates/fsi_coupling/src/residual.rs

//! 界面残差运算
//!
//! 残差定义为固体新位移减去刚施加到流体上的位移，逐点逐分量：
//! `r = d_{k+1} - d_k`。

use fsi_mesh::DVec3;

/// 逐点残差 `new - imposed`
pub fn residual(new: &[DVec3], imposed: &[DVec3]) -> Vec<DVec3> {
    debug_assert_eq!(new.len(), imposed.len());
    new.iter().zip(imposed).map(|(n, d)| *n - *d).collect()
}

/// 全场点积 Σ aᵢ·bᵢ
pub fn dot(a: &[DVec3], b: &[DVec3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x.dot(*y)).sum()
}

/// 全场平方范数
pub fn norm_squared(a: &[DVec3]) -> f64 {
    a.iter().map(|x| x.length_squared()).sum()
}

/// 均方根范数 sqrt(Σ|rᵢ|² / n)
pub fn rms(a: &[DVec3]) -> f64 {
    if a.is_empty() {
        0.0
    } else {
        (norm_squared(a) / a.len() as f64).sqrt()
    }
}

/// `x += f · r`
pub fn axpy(x: &mut [DVec3], f: f64, r: &[DVec3]) {
    for (xi, ri) in x.iter_mut().zip(r) {
        *xi += *ri * f;
    }
}
