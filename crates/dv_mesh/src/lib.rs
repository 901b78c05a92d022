// crates/dv_mesh/src/lib.rs

//! DriftVel 网格层
//!
//! 描述速度场所在的空间网格，并提供点定位与双线性插值。
//!
//! # 模块
//!
//! - [`geo`]: 世界坐标矩形、三维位置、米与经纬度换算
//! - [`grid`]: 网格几何 `GridGeometry`（规则网格 / 曲线网格）
//! - [`locator`]: 单元定位结果、容差和曲线网格的 R-Tree 索引
//!
//! 同一个 mover 加载的所有时间帧共享同一个 `GridGeometry`，
//! 几何在文件头解析完成后不再修改。

#![warn(clippy::all)]

pub mod geo;
pub mod grid;
pub mod locator;

pub use geo::{meters_to_degrees, WorldPoint3D, WorldRect, METERS_PER_DEGREE_LAT};
pub use grid::{CellTopology, GridGeometry, MAX_GRID_POINTS};
pub use locator::{CellLocation, LocateTolerance};
