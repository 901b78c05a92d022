// crates/dv_mover/src/lib.rs

//! DriftVel Mover 模块
//!
//! 把格点时变速度场转换为粒子位移。
//!
//! # 结构
//!
//! - [`frame`]: 时间帧
//! - [`loaded`]: 当前时间区间内驻留的帧对
//! - [`interp`]: 时间插值
//! - [`field`]: 空间 + 时间插值的速度场
//! - [`source`]: 文件扫描、区间选择与帧加载的状态机
//! - [`particle`]: 粒子（LE）记录
//! - [`mover`]: Mover 接口与海流 / 风场实现
//! - [`collection`]: 多个 mover 的步进驱动
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use dv_mover::{AnyMover, Mover};
//!
//! let mut mover = AnyMover::from_path(Path::new("bay.cur"))?;
//! mover.prepare_for_model_run()?;
//! mover.prepare_for_model_step(t, 900.0)?;
//! let delta = mover.get_move(&particle, t, 900.0)?;
//! mover.model_step_is_done();
//! ```

pub mod collection;
pub mod field;
pub mod frame;
pub mod interp;
pub mod loaded;
pub mod mover;
pub mod particle;
pub mod source;

pub use collection::MoverSet;
pub use field::GridVelocityField;
pub use frame::TimeFrame;
pub use interp::TimeInterpolator;
pub use loaded::{Bracket, LoadedData};
pub use mover::{AnyMover, GridCurrentMover, GridWindMover, Mover};
pub use particle::{LeRecord, LeStatus};
pub use source::{GridTimeSource, IntervalCheck, ScanState};
