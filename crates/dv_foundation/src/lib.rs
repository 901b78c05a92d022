// crates/dv_foundation/src/lib.rs

//! DriftVel Foundation Layer
//!
//! 零依赖基础层（仅依赖 serde 和 thiserror），为所有 mover 相关 crate
//! 提供统一的错误类型和速度单位。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `DvError`、错误分类 `ErrorKind` 和步进失败报告
//! - [`units`]: 速度单位及其到 m/s 的换算
//!
//! # 示例
//!
//! ```
//! use dv_foundation::{DvError, ErrorKind, VelocityUnits};
//!
//! let err = DvError::time_range(7200.0, 0.0, 3600.0);
//! assert_eq!(err.kind(), ErrorKind::TimeRange);
//!
//! let knots = VelocityUnits::parse_token("knots").unwrap();
//! assert!((knots.to_meters_per_second() - 0.514444).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod units;

// 重导出常用类型
pub use error::{DvError, DvResult, ErrorKind, StepFailure, MAX_ERROR_MESSAGE_LEN};
pub use units::VelocityUnits;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{DvError, DvResult, ErrorKind, StepFailure};
    pub use crate::units::VelocityUnits;
    pub use crate::{ensure, require};
}
