// crates/dv_mesh/src/grid.rs

//! 网格几何
//!
//! 速度值存储在网格节点上，按行优先排列，第 0 行为最北一行
//! （与文本场文件中 row 1 在最上方的约定一致）。
//!
//! - 规则网格：节点均匀分布在边界矩形上，包含四条边
//! - 曲线网格：每个节点给出显式坐标，边界为节点的包围矩形
//!
//! # 使用示例
//!
//! ```
//! use dv_mesh::{GridGeometry, WorldRect};
//! use glam::DVec2;
//!
//! let grid = GridGeometry::regular(2, 2, WorldRect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
//! let values = vec![DVec2::new(1.0, 0.0); grid.point_count()];
//! let v = grid.interpolate(&values, DVec2::new(0.5, 0.5)).unwrap();
//! assert!((v.x - 1.0).abs() < 1e-12);
//! ```

use dv_foundation::{ensure, DvError, DvResult};
use glam::DVec2;

use crate::geo::WorldRect;
use crate::locator::{inverse_bilinear, quad_nodes, CellIndex, CellLocation, LocateTolerance};

/// 单个网格允许的最大节点数
///
/// 行列数来自文件头，超过该值的网格按无效输入拒绝，避免按损坏的
/// 尺寸分配帧缓冲区。
pub const MAX_GRID_POINTS: usize = 1 << 22;

/// 检查 `rows * cols` 不溢出且不超过 [`MAX_GRID_POINTS`]
fn checked_point_count(rows: usize, cols: usize) -> DvResult<usize> {
    rows.checked_mul(cols)
        .filter(|&n| n <= MAX_GRID_POINTS)
        .ok_or_else(|| {
            DvError::invalid_input(format!(
                "网格过大: {rows} 行 x {cols} 列（上限 {MAX_GRID_POINTS} 个节点）"
            ))
        })
}

/// 单元拓扑
#[derive(Debug, Clone)]
pub enum CellTopology {
    /// 规则矩形网格
    Regular,
    /// 曲线网格（节点坐标显式给出）
    Curvilinear {
        /// 节点坐标，行优先
        nodes: Vec<DVec2>,
    },
}

/// 网格几何
#[derive(Debug, Clone)]
pub struct GridGeometry {
    rows: usize,
    cols: usize,
    bounds: WorldRect,
    topology: CellTopology,
    /// 曲线网格的单元索引
    index: Option<CellIndex>,
    tolerance: LocateTolerance,
}

impl GridGeometry {
    /// 创建规则网格
    ///
    /// 行或列只有 1 个节点时该方向上不插值。
    pub fn regular(rows: usize, cols: usize, bounds: WorldRect) -> DvResult<Self> {
        ensure!(
            rows > 0 && cols > 0,
            DvError::invalid_input(format!("网格尺寸无效: {rows} 行 x {cols} 列"))
        );
        checked_point_count(rows, cols)?;
        ensure!(
            bounds.is_valid(),
            DvError::invalid_input(format!("网格边界无效: {bounds:?}"))
        );
        ensure!(
            (cols < 2 || bounds.width() > 0.0) && (rows < 2 || bounds.height() > 0.0),
            DvError::invalid_input("多节点方向上的网格边界跨度必须为正")
        );

        Ok(Self {
            rows,
            cols,
            bounds,
            topology: CellTopology::Regular,
            index: None,
            tolerance: LocateTolerance::default(),
        })
    }

    /// 创建曲线网格
    ///
    /// `nodes` 按行优先排列，长度必须为 `rows * cols`，且每个方向至少 2 个节点。
    pub fn curvilinear(rows: usize, cols: usize, nodes: Vec<DVec2>) -> DvResult<Self> {
        ensure!(
            rows >= 2 && cols >= 2,
            DvError::invalid_input(format!(
                "曲线网格每个方向至少需要 2 个节点: {rows} 行 x {cols} 列"
            ))
        );
        let expected = checked_point_count(rows, cols)?;
        ensure!(
            nodes.len() == expected,
            DvError::invalid_input(format!(
                "节点数量不匹配: 期望 {expected}, 实际 {}",
                nodes.len()
            ))
        );
        ensure!(
            nodes.iter().all(|p| p.is_finite()),
            DvError::invalid_input("曲线网格节点坐标必须为有限值")
        );

        let bounds = WorldRect::enclosing(&nodes)
            .ok_or_else(|| DvError::invalid_input("曲线网格没有节点"))?;
        let index = CellIndex::build(rows, cols, &nodes);

        Ok(Self {
            rows,
            cols,
            bounds,
            topology: CellTopology::Curvilinear { nodes },
            index: Some(index),
            tolerance: LocateTolerance::default(),
        })
    }

    /// 设置定位容差
    pub fn with_tolerance(mut self, tolerance: LocateTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 行数
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 列数
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 节点总数（每帧速度数组的长度）
    #[inline]
    pub fn point_count(&self) -> usize {
        self.rows * self.cols
    }

    /// 网格边界
    #[inline]
    pub fn bounds(&self) -> WorldRect {
        self.bounds
    }

    /// 单元拓扑
    pub fn topology(&self) -> &CellTopology {
        &self.topology
    }

    /// 是否为规则网格
    pub fn is_regular(&self) -> bool {
        matches!(self.topology, CellTopology::Regular)
    }

    /// 曲线网格节点坐标
    pub fn nodes(&self) -> Option<&[DVec2]> {
        match &self.topology {
            CellTopology::Regular => None,
            CellTopology::Curvilinear { nodes } => Some(nodes),
        }
    }

    /// (行, 列) 对应的数组索引，越界返回 `None`
    #[inline]
    pub fn point_index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// 两个几何是否描述同一网格
    pub fn same_shape(&self, other: &GridGeometry) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.bounds == other.bounds
    }

    /// 定位点所在单元
    ///
    /// 点在网格外时返回 `None`。
    pub fn locate(&self, p: DVec2) -> Option<CellLocation> {
        if !p.is_finite() || !self.bounds.contains(p) {
            return None;
        }

        match (&self.topology, &self.index) {
            (CellTopology::Curvilinear { nodes }, Some(index)) => {
                self.locate_curvilinear(nodes, index, p)
            }
            _ => Some(self.locate_regular(p)),
        }
    }

    fn locate_regular(&self, p: DVec2) -> CellLocation {
        let b = &self.bounds;
        let (c0, c1, s) = axis_weights(p.x - b.lo_x, b.width(), self.cols);
        // 第 0 行在北边界
        let (r0, r1, t) = axis_weights(b.hi_y - p.y, b.height(), self.rows);

        let corners = [
            r0 * self.cols + c0,
            r0 * self.cols + c1,
            r1 * self.cols + c0,
            r1 * self.cols + c1,
        ];
        CellLocation::bilinear(corners, s, t)
    }

    fn locate_curvilinear(
        &self,
        nodes: &[DVec2],
        index: &CellIndex,
        p: DVec2,
    ) -> Option<CellLocation> {
        let tol = &self.tolerance;
        index.candidates(p).find_map(|cell| {
            let quad = quad_nodes(self.cols, nodes, cell.row, cell.col);
            let (s, t) = inverse_bilinear(&quad, p, tol)?;
            let inside = -tol.inside_tol..=1.0 + tol.inside_tol;
            if !inside.contains(&s) || !inside.contains(&t) {
                return None;
            }
            let corners = [
                cell.row * self.cols + cell.col,
                cell.row * self.cols + cell.col + 1,
                (cell.row + 1) * self.cols + cell.col,
                (cell.row + 1) * self.cols + cell.col + 1,
            ];
            Some(CellLocation::bilinear(corners, s.clamp(0.0, 1.0), t.clamp(0.0, 1.0)))
        })
    }

    /// 在点 `p` 处对一帧速度做空间插值
    ///
    /// # 错误
    ///
    /// - 点在网格外: `OffGrid`
    /// - 速度数组长度与网格节点数不符: `InvalidInput`
    pub fn interpolate(&self, values: &[DVec2], p: DVec2) -> DvResult<DVec2> {
        if values.len() != self.point_count() {
            return Err(DvError::invalid_input(format!(
                "速度数组长度 {} 与网格节点数 {} 不符",
                values.len(),
                self.point_count()
            )));
        }
        let loc = self.locate(p).ok_or_else(|| DvError::off_grid(p.x, p.y))?;
        Ok(loc.apply(values))
    }
}

/// 一维方向上的插值节点与权重
///
/// 返回 (i0, i1, w)，插值值为 (1-w)*v[i0] + w*v[i1]。
#[inline]
fn axis_weights(offset: f64, span: f64, n: usize) -> (usize, usize, f64) {
    if n < 2 || span <= 0.0 {
        return (0, 0, 0.0);
    }
    let f = (offset / span * (n - 1) as f64).clamp(0.0, (n - 1) as f64);
    let i0 = (f.floor() as usize).min(n - 2);
    let w = (f - i0 as f64).clamp(0.0, 1.0);
    (i0, i0 + 1, w)
}
