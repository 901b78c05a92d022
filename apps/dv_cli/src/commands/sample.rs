// apps/dv_cli/src/commands/sample.rs

//! 速度查询命令

use anyhow::{Context, Result};
use clap::Args;
use dv_io::time::format_model_time;
use dv_mover::{AnyMover, Mover};
use glam::DVec2;
use std::path::PathBuf;

use super::parse_time_arg;

/// 查询参数
#[derive(Args)]
pub struct SampleArgs {
    /// 场文件路径
    #[arg(short, long)]
    pub file: PathBuf,

    /// 经度
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// 纬度
    #[arg(long, allow_hyphen_values = true)]
    pub y: f64,

    /// 查询时间（ISO 8601 UTC，或模型秒数）
    #[arg(short, long)]
    pub time: String,

    /// 速度缩放系数
    #[arg(long, default_value = "1.0")]
    pub scale: f64,

    /// 允许超出文件时间覆盖范围
    #[arg(long)]
    pub extrapolate: bool,
}

/// 执行查询命令
pub fn execute(args: SampleArgs) -> Result<()> {
    let time = parse_time_arg(&args.time)?;

    let mut mover = AnyMover::from_path(&args.file)
        .with_context(|| format!("无法打开场文件 {}", args.file.display()))?;
    let config = mover
        .config()
        .clone()
        .with_scale(args.scale)
        .with_extrapolation(args.extrapolate);
    mover.update_config(config)?;

    let v = mover
        .velocity_at(DVec2::new(args.x, args.y), time)
        .with_context(|| format!("({}, {}) @ {} 查询失败", args.x, args.y, args.time))?;

    println!(
        "{} ({}, {}) @ {}: u = {:.6} m/s, v = {:.6} m/s, |V| = {:.6} m/s",
        mover.name(),
        args.x,
        args.y,
        format_model_time(time),
        v.x,
        v.y,
        v.length()
    );

    Ok(())
}
