// apps/dv_cli/src/commands/convert.rs

//! 格式转换命令
//!
//! 读取文本（或多文件引用）场文件的全部时间帧，写为二进制场文件。
//! 速度按文件原单位保存，单位声明原样写入。

use anyhow::{Context, Result};
use clap::Args;
use dv_io::{read_time_data, scan_file_for_times, write_binary_field};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// 转换参数
#[derive(Args)]
pub struct ConvertArgs {
    /// 输入场文件
    pub input: PathBuf,

    /// 输出二进制文件
    #[arg(short, long)]
    pub output: PathBuf,
}

/// 执行转换命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    let scan = scan_file_for_times(&args.input)
        .with_context(|| format!("无法扫描 {}", args.input.display()))?;

    let mut frames = Vec::with_capacity(scan.index.len());
    for i in 0..scan.index.len() {
        let mut values = Vec::new();
        let time = read_time_data(&scan, i, &mut values)
            .with_context(|| format!("读取第 {i} 帧失败"))?;
        frames.push((time, values));
    }

    let file = File::create(&args.output)
        .with_context(|| format!("无法创建 {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    write_binary_field(
        &mut writer,
        scan.header.kind,
        scan.header.declared_units,
        &scan.header.geometry,
        &frames,
    )?;
    writer.flush()?;

    info!(
        "{} -> {}: {} 帧, {} 个节点",
        args.input.display(),
        args.output.display(),
        frames.len(),
        scan.header.geometry.point_count()
    );
    Ok(())
}
