// apps/dv_cli/src/commands/mod.rs

//! 子命令

pub mod convert;
pub mod run;
pub mod sample;
pub mod scan;

use anyhow::{anyhow, Result};
use dv_io::time::parse_model_time;

/// 解析命令行 / 场景中的时间（ISO 8601 UTC 或秒数）
pub(crate) fn parse_time_arg(text: &str) -> Result<f64> {
    parse_model_time(text).ok_or_else(|| anyhow!("无法解析时间: {text}"))
}
