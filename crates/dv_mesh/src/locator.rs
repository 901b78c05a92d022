// crates/dv_mesh/src/locator.rs

//! 单元定位
//!
//! 定位结果是四个角点索引及其双线性权重，可以直接作用于任意一帧的
//! 速度数组。曲线网格使用 R-Tree 索引单元包围盒，再在候选单元内
//! 用牛顿迭代求解逆双线性映射。

use glam::DVec2;
use rstar::{RTree, RTreeObject, AABB};
use std::fmt;

// ============================================================
// 容差配置
// ============================================================

/// 定位容差配置
#[derive(Debug, Clone, Copy)]
pub struct LocateTolerance {
    /// 参数坐标判断容差
    ///
    /// 当参数坐标 (s, t) 大于 -inside_tol 且小于 1 + inside_tol 时认为点在单元内。
    pub inside_tol: f64,

    /// 牛顿迭代收敛容差（世界坐标）
    pub newton_tol: f64,

    /// 退化单元判断容差（雅可比行列式）
    pub degenerate_tol: f64,
}

impl Default for LocateTolerance {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl LocateTolerance {
    /// 标准容差
    pub const STANDARD: Self = Self {
        inside_tol: 1e-9,
        newton_tol: 1e-12,
        degenerate_tol: 1e-18,
    };

    /// 宽松容差
    pub const RELAXED: Self = Self {
        inside_tol: 1e-6,
        newton_tol: 1e-9,
        degenerate_tol: 1e-14,
    };
}

// ============================================================
// 定位结果
// ============================================================

/// 单元定位结果
///
/// 角点顺序：(r0,c0), (r0,c1), (r1,c0), (r1,c1)。权重之和为 1。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLocation {
    /// 四个角点在速度数组中的索引
    pub corners: [usize; 4],
    /// 对应的双线性权重
    pub weights: [f64; 4],
}

impl CellLocation {
    /// 从参数坐标 (s, t) 构造
    pub fn bilinear(corners: [usize; 4], s: f64, t: f64) -> Self {
        Self {
            corners,
            weights: [(1.0 - s) * (1.0 - t), s * (1.0 - t), (1.0 - s) * t, s * t],
        }
    }

    /// 对一帧速度值插值
    ///
    /// 调用方保证 `values` 长度等于网格点数。
    #[inline]
    pub fn apply(&self, values: &[DVec2]) -> DVec2 {
        self.corners
            .iter()
            .zip(self.weights.iter())
            .fold(DVec2::ZERO, |acc, (&i, &w)| acc + values[i] * w)
    }
}

// ============================================================
// 逆双线性映射
// ============================================================

/// 双线性四边形上的点
#[inline]
fn bilinear_point(q: &[DVec2; 4], s: f64, t: f64) -> DVec2 {
    q[0] * ((1.0 - s) * (1.0 - t)) + q[1] * (s * (1.0 - t)) + q[2] * ((1.0 - s) * t) + q[3] * (s * t)
}

/// 求解 P(s, t) = p 的参数坐标
///
/// 四边形角点顺序同 [`CellLocation`]。迭代不收敛或单元退化时返回 `None`。
pub fn inverse_bilinear(q: &[DVec2; 4], p: DVec2, tol: &LocateTolerance) -> Option<(f64, f64)> {
    let mut s = 0.5;
    let mut t = 0.5;

    for _ in 0..32 {
        let residual = bilinear_point(q, s, t) - p;
        if residual.length_squared() <= tol.newton_tol * tol.newton_tol {
            return Some((s, t));
        }

        let d_ds = (q[1] - q[0]) * (1.0 - t) + (q[3] - q[2]) * t;
        let d_dt = (q[2] - q[0]) * (1.0 - s) + (q[3] - q[1]) * s;
        let det = d_ds.x * d_dt.y - d_ds.y * d_dt.x;
        if det.abs() < tol.degenerate_tol {
            return None;
        }

        let ds = (residual.x * d_dt.y - residual.y * d_dt.x) / det;
        let dt = (d_ds.x * residual.y - d_ds.y * residual.x) / det;
        s -= ds;
        t -= dt;

        if !s.is_finite() || !t.is_finite() {
            return None;
        }
    }

    // 迭代次数用尽时用残差做最后判断
    let residual = bilinear_point(q, s, t) - p;
    let scale = (q[3] - q[0]).length().max((q[2] - q[1]).length()).max(1.0);
    (residual.length() <= 1e-9 * scale).then_some((s, t))
}

// ============================================================
// 曲线网格单元索引
// ============================================================

/// 单元包围盒
#[derive(Debug, Clone)]
pub(crate) struct CellEnvelope {
    /// 单元左上角的行
    pub row: usize,
    /// 单元左上角的列
    pub col: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl CellEnvelope {
    fn new(row: usize, col: usize, quad: &[DVec2; 4]) -> Self {
        let mut min = [f64::MAX, f64::MAX];
        let mut max = [f64::MIN, f64::MIN];
        for v in quad {
            min[0] = min[0].min(v.x);
            min[1] = min[1].min(v.y);
            max[0] = max[0].max(v.x);
            max[1] = max[1].max(v.y);
        }
        Self { row, col, min, max }
    }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// 曲线网格的单元 R-Tree 索引
#[derive(Clone)]
pub(crate) struct CellIndex {
    tree: RTree<CellEnvelope>,
}

impl CellIndex {
    /// 从节点数组构建索引（节点按行优先存储）
    pub fn build(rows: usize, cols: usize, nodes: &[DVec2]) -> Self {
        let mut envelopes = Vec::with_capacity(rows.saturating_sub(1) * cols.saturating_sub(1));
        for r in 0..rows.saturating_sub(1) {
            for c in 0..cols.saturating_sub(1) {
                let quad = quad_nodes(cols, nodes, r, c);
                envelopes.push(CellEnvelope::new(r, c, &quad));
            }
        }
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// 包围盒包含该点的候选单元
    pub fn candidates(&self, p: DVec2) -> impl Iterator<Item = &CellEnvelope> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([p.x, p.y]))
    }

    /// 索引中的单元数
    pub fn len(&self) -> usize {
        self.tree.size()
    }
}

impl fmt::Debug for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellIndex").field("cells", &self.len()).finish()
    }
}

/// 取单元 (r, c) 的四个角点
#[inline]
pub(crate) fn quad_nodes(cols: usize, nodes: &[DVec2], r: usize, c: usize) -> [DVec2; 4] {
    [
        nodes[r * cols + c],
        nodes[r * cols + c + 1],
        nodes[(r + 1) * cols + c],
        nodes[(r + 1) * cols + c + 1],
    ]
}
