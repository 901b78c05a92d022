// crates/dv_mover/src/interp.rs

//! 时间插值
//!
//! 区间分数 `t = (time - t0) / (t1 - t0)`，不允许外推时截断到 [0, 1]。
//! 分数恰为 0 或 1 时直接返回对应帧的值，不引入混合误差。

use glam::DVec2;

/// 时间插值器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeInterpolator {
    /// 是否允许外推
    pub allow_extrapolation: bool,
}

impl TimeInterpolator {
    /// 创建插值器
    pub fn new(allow_extrapolation: bool) -> Self {
        Self { allow_extrapolation }
    }

    /// 区间分数
    ///
    /// 两帧时间相同时返回 0。
    #[inline]
    pub fn fraction(&self, t0: f64, t1: f64, time: f64) -> f64 {
        let span = t1 - t0;
        if span == 0.0 {
            return 0.0;
        }
        let f = (time - t0) / span;
        if self.allow_extrapolation {
            f
        } else {
            f.clamp(0.0, 1.0)
        }
    }

    /// 线性混合
    #[inline]
    pub fn blend(&self, v0: DVec2, v1: DVec2, fraction: f64) -> DVec2 {
        if fraction == 0.0 {
            v0
        } else if fraction == 1.0 {
            v1
        } else {
            v0 + (v1 - v0) * fraction
        }
    }

    /// 逐节点混合两帧，结果写入 `out`
    pub fn blend_into(&self, v0: &[DVec2], v1: &[DVec2], fraction: f64, out: &mut Vec<DVec2>) {
        out.clear();
        out.extend(v0.iter().zip(v1).map(|(&a, &b)| self.blend(a, b, fraction)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_clamped() {
        let interp = TimeInterpolator::new(false);
        assert_eq!(interp.fraction(0.0, 3600.0, 1800.0), 0.5);
        assert_eq!(interp.fraction(0.0, 3600.0, -100.0), 0.0);
        assert_eq!(interp.fraction(0.0, 3600.0, 7200.0), 1.0);
        assert_eq!(interp.fraction(5.0, 5.0, 100.0), 0.0);
    }

    #[test]
    fn test_fraction_extrapolated() {
        let interp = TimeInterpolator::new(true);
        assert_eq!(interp.fraction(0.0, 3600.0, 7200.0), 2.0);
        assert_eq!(interp.fraction(0.0, 3600.0, -3600.0), -1.0);
    }

    #[test]
    fn test_blend_endpoints_exact() {
        let interp = TimeInterpolator::default();
        let a = DVec2::new(0.1, 0.7);
        let b = DVec2::new(0.3, -0.2);
        assert_eq!(interp.blend(a, b, 0.0), a);
        assert_eq!(interp.blend(a, b, 1.0), b);

        let mid = interp.blend(DVec2::new(1.0, 0.0), DVec2::new(3.0, 0.0), 0.5);
        assert!((mid.x - 2.0).abs() < 1e-12);
        assert!(mid.y.abs() < 1e-12);
    }

    #[test]
    fn test_blend_into() {
        let interp = TimeInterpolator::default();
        let mut out = vec![DVec2::splat(9.0); 7];
        interp.blend_into(&[DVec2::ZERO, DVec2::X], &[DVec2::Y, DVec2::X * 3.0], 0.25, &mut out);
        assert_eq!(out.len(), 2);
        assert!((out[0].y - 0.25).abs() < 1e-12);
        assert!((out[1].x - 1.5).abs() < 1e-12);
    }
}
