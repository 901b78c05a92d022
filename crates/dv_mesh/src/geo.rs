// crates/dv_mesh/src/geo.rs

//! 世界坐标工具
//!
//! 世界坐标使用 (经度, 纬度)，单位为度。速度场以 m/s 给出，
//! 粒子位移在返回前换算回度。

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 每纬度对应的米数
pub const METERS_PER_DEGREE_LAT: f64 = 111_120.0;

/// 世界坐标矩形（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    /// 最小经度
    pub lo_x: f64,
    /// 最小纬度
    pub lo_y: f64,
    /// 最大经度
    pub hi_x: f64,
    /// 最大纬度
    pub hi_y: f64,
}

impl WorldRect {
    /// 创建矩形
    pub fn new(lo_x: f64, lo_y: f64, hi_x: f64, hi_y: f64) -> Self {
        Self { lo_x, lo_y, hi_x, hi_y }
    }

    /// 包含全部点的最小矩形
    pub fn enclosing(points: &[DVec2]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            rect.lo_x = rect.lo_x.min(p.x);
            rect.lo_y = rect.lo_y.min(p.y);
            rect.hi_x = rect.hi_x.max(p.x);
            rect.hi_y = rect.hi_y.max(p.y);
        }
        Some(rect)
    }

    /// 宽度（经度跨度）
    #[inline]
    pub fn width(&self) -> f64 {
        self.hi_x - self.lo_x
    }

    /// 高度（纬度跨度）
    #[inline]
    pub fn height(&self) -> f64 {
        self.hi_y - self.lo_y
    }

    /// 是否为有效矩形（有限且 hi >= lo）
    pub fn is_valid(&self) -> bool {
        [self.lo_x, self.lo_y, self.hi_x, self.hi_y]
            .iter()
            .all(|v| v.is_finite())
            && self.hi_x >= self.lo_x
            && self.hi_y >= self.lo_y
    }

    /// 点是否在矩形内（含边界）
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.lo_x && p.x <= self.hi_x && p.y >= self.lo_y && p.y <= self.hi_y
    }
}

/// 三维位置：水平位置（度）加深度（米，向下为正）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint3D {
    /// 经纬度
    pub p: DVec2,
    /// 深度 [m]
    pub z: f64,
}

impl WorldPoint3D {
    /// 创建三维位置
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { p: DVec2::new(x, y), z }
    }

    /// 水面上的位置
    pub fn surface(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    /// 零位移
    pub const ZERO: Self = Self { p: DVec2::ZERO, z: 0.0 };
}

/// 把米为单位的位移换算为经纬度位移
///
/// 经度方向按所在纬度的余弦缩放；极点附近余弦取下限避免发散。
pub fn meters_to_degrees(delta_m: DVec2, latitude: f64) -> DVec2 {
    let cos_lat = latitude.to_radians().cos().abs().max(1e-6);
    DVec2::new(
        delta_m.x / (METERS_PER_DEGREE_LAT * cos_lat),
        delta_m.y / METERS_PER_DEGREE_LAT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = WorldRect::new(-120.0, 30.0, -119.0, 31.0);
        assert!(r.contains(DVec2::new(-120.0, 30.0)));
        assert!(r.contains(DVec2::new(-119.0, 31.0)));
        assert!(!r.contains(DVec2::new(-118.9, 30.5)));
    }

    #[test]
    fn test_enclosing() {
        let pts = [DVec2::new(1.0, 5.0), DVec2::new(-2.0, 3.0), DVec2::new(0.0, 7.0)];
        let r = WorldRect::enclosing(&pts).unwrap();
        assert_eq!(r, WorldRect::new(-2.0, 3.0, 1.0, 7.0));
        assert!(WorldRect::enclosing(&[]).is_none());
    }

    #[test]
    fn test_meters_to_degrees_equator() {
        let d = meters_to_degrees(DVec2::new(METERS_PER_DEGREE_LAT, METERS_PER_DEGREE_LAT), 0.0);
        assert!((d.x - 1.0).abs() < 1e-12);
        assert!((d.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_meters_to_degrees_mid_latitude() {
        let d = meters_to_degrees(DVec2::new(METERS_PER_DEGREE_LAT, 0.0), 60.0);
        assert!((d.x - 2.0).abs() < 1e-9);
        assert_eq!(d.y, 0.0);
    }
}
