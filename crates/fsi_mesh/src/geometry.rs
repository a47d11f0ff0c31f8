// crates/fsi_mesh/src/geometry.rs

//! 界面几何工具
//!
//! - 多边形面的形心与面积矢量（三角扇分解）
//! - 三维轴对齐包围盒
//! - 局部平面坐标系与二维投影
//! - 凸多边形裁剪（Sutherland–Hodgman），用于重叠面积计算
//! - 点到多边形面的最近点

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use fsi_foundation::{SMALL, VSMALL};

// ============================================================================
// 面几何
// ============================================================================

/// 计算多边形面的形心与面积矢量
///
/// 三角形直接计算；多边形以顶点平均点为中心做三角扇分解，
/// 形心按子三角形面积加权。面积矢量的模为面积，方向遵循右手法则。
pub fn face_centre_and_area(points: &[DVec3]) -> (DVec3, DVec3) {
    let n = points.len();
    if n == 3 {
        let area = 0.5 * (points[1] - points[0]).cross(points[2] - points[0]);
        return ((points[0] + points[1] + points[2]) / 3.0, area);
    }

    let p_avg = points.iter().copied().sum::<DVec3>() / n as f64;

    let mut sum_n = DVec3::ZERO;
    let mut sum_a = 0.0;
    let mut sum_ac = DVec3::ZERO;

    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let c = p + q + p_avg;
        let tri_n = (q - p).cross(p_avg - p);
        let a = tri_n.length();

        sum_n += tri_n;
        sum_a += a;
        sum_ac += a * c;
    }

    let centre = if sum_a < VSMALL {
        p_avg
    } else {
        sum_ac / (3.0 * sum_a)
    };

    (centre, 0.5 * sum_n)
}

// ============================================================================
// 包围盒
// ============================================================================

/// 三维轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    /// 最小角点
    pub min: DVec3,
    /// 最大角点
    pub max: DVec3,
}

impl BoundingBox3 {
    /// 空包围盒（任何点加入后即有效）
    pub fn empty() -> Self {
        Self {
            min: DVec3::splat(f64::MAX),
            max: DVec3::splat(f64::MIN),
        }
    }

    /// 从点集构建
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.include(*p);
        }
        bb
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// 扩展以包含点
    pub fn include(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// 各方向扩展指定量
    #[must_use]
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min: self.min - DVec3::splat(amount),
            max: self.max + DVec3::splat(amount),
        }
    }

    /// 检查两个包围盒是否相交（闭区间）
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// 尺寸
    pub fn size(&self) -> DVec3 {
        if self.is_empty() {
            DVec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// 对角线长度
    pub fn diagonal(&self) -> f64 {
        self.size().length()
    }
}

// ============================================================================
// 局部平面坐标系
// ============================================================================

/// 以单位法向定义的局部平面坐标系
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    /// 原点
    pub origin: DVec3,
    /// 面内第一基矢
    pub e1: DVec3,
    /// 面内第二基矢
    pub e2: DVec3,
    /// 单位法向
    pub normal: DVec3,
}

impl PlaneFrame {
    /// 由原点与法向构建，法向长度过小时返回 `None`
    pub fn new(origin: DVec3, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        // 选与法向夹角最大的坐标轴构造 e1
        let helper = if normal.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let e1 = helper.cross(normal).normalize();
        let e2 = normal.cross(e1);
        Some(Self { origin, e1, e2, normal })
    }

    /// 投影到面内二维坐标
    #[inline]
    pub fn project(&self, p: DVec3) -> DVec2 {
        let d = p - self.origin;
        DVec2::new(d.dot(self.e1), d.dot(self.e2))
    }

    /// 到平面的有向距离
    #[inline]
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        (p - self.origin).dot(self.normal)
    }

    /// 投影点集
    pub fn project_all(&self, points: &[DVec3]) -> Vec<DVec2> {
        points.iter().map(|p| self.project(*p)).collect()
    }
}

// ============================================================================
// 二维多边形
// ============================================================================

/// 有向面积（逆时针为正）
pub fn polygon_area_2d(poly: &[DVec2]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        twice += a.perp_dot(b);
    }
    0.5 * twice
}

/// 用凸多边形 `clip` 裁剪任意多边形 `subject`（Sutherland–Hodgman）
///
/// `clip` 的朝向会被自动调整为逆时针。返回裁剪后的多边形，
/// 无重叠时返回空向量。
pub fn clip_convex(subject: &[DVec2], clip: &[DVec2]) -> Vec<DVec2> {
    if subject.len() < 3 || clip.len() < 3 {
        return Vec::new();
    }

    let ccw: Vec<DVec2> = if polygon_area_2d(clip) < 0.0 {
        clip.iter().rev().copied().collect()
    } else {
        clip.to_vec()
    };

    let mut output = subject.to_vec();
    let n = ccw.len();

    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let a = ccw[i];
        let b = ccw[(i + 1) % n];
        let edge = b - a;
        let inside = |p: DVec2| edge.perp_dot(p - a) >= 0.0;

        let input = std::mem::take(&mut output);
        let m = input.len();
        for j in 0..m {
            let cur = input[j];
            let prev = input[(j + m - 1) % m];
            let cur_in = inside(cur);
            let prev_in = inside(prev);

            if cur_in {
                if !prev_in {
                    output.push(segment_line_intersection(prev, cur, a, b));
                }
                output.push(cur);
            } else if prev_in {
                output.push(segment_line_intersection(prev, cur, a, b));
            }
        }
    }

    output
}

/// 线段 p→q 与直线 a→b 的交点
fn segment_line_intersection(p: DVec2, q: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let edge = b - a;
    let dp = edge.perp_dot(p - a);
    let dq = edge.perp_dot(q - a);
    let denom = dp - dq;
    if denom.abs() < VSMALL {
        return p;
    }
    p + (q - p) * (dp / denom)
}

/// 两个多边形面在目标面平面内的重叠面积
///
/// 两个面都投影到 `frame` 所在平面，`target` 视为凸多边形。
pub fn overlap_area(source: &[DVec3], target: &[DVec3], frame: &PlaneFrame) -> f64 {
    let s2 = frame.project_all(source);
    let t2 = frame.project_all(target);
    polygon_area_2d(&clip_convex(&s2, &t2)).abs()
}

/// 点是否在凸多边形内（含边界，允许 `tol` 的外侧偏差）
pub fn point_in_convex_polygon(p: DVec2, poly: &[DVec2], tol: f64) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let sign = if polygon_area_2d(poly) < 0.0 { -1.0 } else { 1.0 };
    (0..n).all(|i| {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let edge = b - a;
        let len = edge.length().max(SMALL);
        sign * edge.perp_dot(p - a) / len >= -tol
    })
}

// ============================================================================
// 最近点
// ============================================================================

/// 点到线段的最近点
pub fn closest_point_on_segment(p: DVec3, a: DVec3, b: DVec3) -> DVec3 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < VSMALL {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// 点到多边形面的最近点与距离
///
/// 点先沿法向投影到面所在平面；若投影点落在面内则即为最近点，
/// 否则取到各边最近点中距离最小者。
pub fn closest_point_on_face(p: DVec3, face: &[DVec3], area_vector: DVec3) -> (DVec3, f64) {
    let centre = face.iter().copied().sum::<DVec3>() / face.len() as f64;

    if let Some(frame) = PlaneFrame::new(centre, area_vector) {
        let projected = p - frame.normal * frame.signed_distance(p);
        let poly = frame.project_all(face);
        if point_in_convex_polygon(frame.project(projected), &poly, 0.0) {
            return (projected, p.distance(projected));
        }
    }

    let n = face.len();
    let mut best = face[0];
    let mut best_d = f64::MAX;
    for i in 0..n {
        let c = closest_point_on_segment(p, face[i], face[(i + 1) % n]);
        let d = p.distance(c);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    (best, best_d)
}

/// 归一化反距离权重
///
/// 若点与某个顶点重合（距离小于 `SMALL` 倍的顶点尺度），该顶点权重为 1。
pub fn inverse_distance_weights(p: DVec3, vertices: &[DVec3]) -> Vec<f64> {
    let scale = BoundingBox3::from_points(vertices).diagonal().max(1.0);
    let dists: Vec<f64> = vertices.iter().map(|v| p.distance(*v)).collect();

    if let Some(hit) = dists.iter().position(|&d| d <= 1e-12 * scale) {
        let mut w = vec![0.0; vertices.len()];
        w[hit] = 1.0;
        return w;
    }

    let inv: Vec<f64> = dists.iter().map(|d| 1.0 / d).collect();
    let sum: f64 = inv.iter().sum();
    inv.into_iter().map(|w| w / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_face_centre_and_area_quad() {
        let (c, a) = face_centre_and_area(&unit_square());
        assert!((c - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-14);
        assert!((a - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-14);
    }

    #[test]
    fn test_face_centre_and_area_triangle() {
        let tri = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 2.0, 0.0)];
        let (c, a) = face_centre_and_area(&tri);
        assert!((a.z - 2.0).abs() < 1e-14);
        assert!((c - DVec3::new(2.0 / 3.0, 2.0 / 3.0, 0.0)).length() < 1e-14);
    }

    #[test]
    fn test_clip_half_overlap() {
        let a = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        let b: Vec<DVec2> = a.iter().map(|p| *p + DVec2::new(0.5, 0.0)).collect();
        let clipped = clip_convex(&a, &b);
        assert!((polygon_area_2d(&clipped).abs() - 0.5).abs() < 1e-14);

        // 裁剪多边形为顺时针时结果一致
        let b_cw: Vec<DVec2> = b.iter().rev().copied().collect();
        let clipped = clip_convex(&a, &b_cw);
        assert!((polygon_area_2d(&clipped).abs() - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_clip_disjoint() {
        let a = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)];
        let b: Vec<DVec2> = a.iter().map(|p| *p + DVec2::new(5.0, 5.0)).collect();
        assert!(polygon_area_2d(&clip_convex(&a, &b)).abs() < 1e-14);
    }

    #[test]
    fn test_overlap_area_with_flipped_normal() {
        let target = unit_square();
        let source: Vec<DVec3> = target.iter().rev().copied().collect();
        let (c, n) = face_centre_and_area(&target);
        let frame = PlaneFrame::new(c, n).unwrap();
        assert!((overlap_area(&source, &target, &frame) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_closest_point_on_face() {
        let face = unit_square();
        let (_, n) = face_centre_and_area(&face);
        let (cp, d) = closest_point_on_face(DVec3::new(0.25, 0.5, 2.0), &face, n);
        assert!((cp - DVec3::new(0.25, 0.5, 0.0)).length() < 1e-14);
        assert!((d - 2.0).abs() < 1e-14);

        let (cp, d) = closest_point_on_face(DVec3::new(2.0, 0.5, 0.0), &face, n);
        assert!((cp - DVec3::new(1.0, 0.5, 0.0)).length() < 1e-14);
        assert!((d - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_inverse_distance_weights() {
        let face = unit_square();
        let w = inverse_distance_weights(DVec3::new(0.5, 0.5, 0.0), &face);
        assert!(w.iter().all(|x| (x - 0.25).abs() < 1e-14));

        let w = inverse_distance_weights(DVec3::new(1.0, 0.0, 0.0), &face);
        assert_eq!(w, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bounding_box() {
        let bb = BoundingBox3::from_points(&unit_square());
        assert!((bb.diagonal() - 2f64.sqrt()).abs() < 1e-14);
        let far = BoundingBox3::from_points(&[DVec3::splat(3.0), DVec3::splat(4.0)]);
        assert!(!bb.intersects(&far));
        // z 方向只有 [0, 0]，需扩展 3 以上才能碰到 z = 3
        assert!(!bb.expand(2.5).intersects(&far));
        assert!(bb.expand(3.5).intersects(&far));
        assert!(BoundingBox3::empty().is_empty());
    }
}
