// crates/dv_config/src/lib.rs

//! DriftVel Config Layer
//!
//! 配置层，描述 mover 的用户设置和命令行运行场景。
//!
//! # 模块概览
//!
//! - [`mover_config`]: `MoverKind` 与 `MoverConfig`（文件路径、单位、缩放、外推、优化标志）
//! - [`scenario`]: `ScenarioConfig` 运行场景（起始时间、步长、粒子）
//! - [`error`]: 配置错误类型
//!
//! 配置在加载时设定一次，之后只能通过显式的设置操作修改。
//! 所有配置都以 JSON 存储。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mover_config;
pub mod scenario;

// 重导出核心类型
pub use error::ConfigError;
pub use mover_config::{MoverConfig, MoverKind};
pub use scenario::{ParticleSeed, ScenarioConfig};
