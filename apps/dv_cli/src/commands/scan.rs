// apps/dv_cli/src/commands/scan.rs

//! 扫描命令
//!
//! 显示场文件的类型、单位、网格和时间覆盖范围。

use anyhow::{Context, Result};
use clap::Args;
use dv_io::time::format_model_time;
use dv_mover::{AnyMover, Mover};
use std::path::PathBuf;
use tracing::info;

/// 扫描参数
#[derive(Args)]
pub struct ScanArgs {
    /// 场文件路径
    pub file: PathBuf,

    /// 列出全部时间记录
    #[arg(long)]
    pub times: bool,
}

/// 执行扫描命令
pub fn execute(args: ScanArgs) -> Result<()> {
    info!("扫描 {}", args.file.display());

    let mover = AnyMover::from_path(&args.file)
        .with_context(|| format!("无法打开场文件 {}", args.file.display()))?;
    let source = mover.source();
    let scan = source.scan().context("扫描结果不可用")?;
    let geometry = &scan.header.geometry;
    let bounds = geometry.bounds();

    println!("=== {} ===", mover.name());
    println!("类型: {}", mover.class_id());
    println!("格式: {:?}", scan.format);
    match scan.header.declared_units {
        Some(units) => println!("单位: {}", units.token()),
        None => println!("单位: (未声明)"),
    }
    println!(
        "网格: {} 行 x {} 列 ({})",
        geometry.rows(),
        geometry.cols(),
        if geometry.is_regular() { "规则" } else { "曲线" }
    );
    println!(
        "范围: 经度 [{}, {}], 纬度 [{}, {}]",
        bounds.lo_x, bounds.hi_x, bounds.lo_y, bounds.hi_y
    );
    println!("文件数: {}", mover.file_count());
    println!("时间记录: {}", mover.time_count());

    if let Some((start, end)) = scan.index.time_range() {
        println!("覆盖: {} -> {}", format_model_time(start), format_model_time(end));
    }

    if args.times {
        for (i, record) in scan.index.records().iter().enumerate() {
            let file = scan
                .record_path(&record.locator)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("  [{i:4}] {}  {file}", format_model_time(record.time));
        }
    }

    Ok(())
}
