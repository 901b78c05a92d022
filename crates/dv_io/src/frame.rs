// crates/dv_io/src/frame.rs

//! 单帧读取
//!
//! 按时间索引中记录的位置读取一个时间帧的速度值（文件单位，未换算）。
//! 结果写入调用方提供的缓冲区，长度等于网格节点数。

use glam::DVec2;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::index::TimeRecord;
use crate::scan::{FieldFormat, FieldScan};
use crate::sniff::is_blank_or_comment;

/// 读取第 `index` 条记录的速度帧
///
/// 返回该帧的时间。文本文件中未列出的节点速度为零。
pub fn read_time_data(scan: &FieldScan, index: usize, out: &mut Vec<DVec2>) -> IoResult<f64> {
    let record = scan.index.get(index).copied().ok_or_else(|| {
        IoError::corrupt(
            &scan.path,
            0,
            format!("时间记录序号 {index} 越界（共 {} 条）", scan.index.len()),
        )
    })?;

    let path = scan.record_path(&record.locator)?;
    let geometry = &scan.header.geometry;
    let n = geometry.point_count();

    let mut file = IoError::open(path)?;
    let file_len = file.metadata()?.len();
    if record.locator.offset > file_len {
        return Err(IoError::Truncated {
            file: path.to_path_buf(),
            expected: record.locator.offset,
            actual: file_len,
        });
    }
    file.seek(SeekFrom::Start(record.locator.offset))?;

    out.clear();
    out.resize(n, DVec2::ZERO);

    match scan.format {
        FieldFormat::Binary => read_binary_frame(file, file_len, path, &record, out)?,
        FieldFormat::Text | FieldFormat::FileList => {
            read_text_frame(file, path, &record, geometry.rows(), geometry.cols(), out)?
        }
    }

    debug!("加载时间帧 #{} (t = {}) 自 {}", index, record.time, path.display());
    Ok(record.time)
}

fn read_binary_frame(
    mut file: File,
    file_len: u64,
    path: &Path,
    record: &TimeRecord,
    out: &mut [DVec2],
) -> IoResult<()> {
    let bytes = out.len() as u64 * 8;
    let expected = record.locator.offset + bytes;
    if expected > file_len {
        return Err(IoError::Truncated {
            file: path.to_path_buf(),
            expected,
            actual: file_len,
        });
    }

    let mut buf = vec![0u8; bytes as usize];
    file.read_exact(&mut buf)?;

    for (v, chunk) in out.iter_mut().zip(buf.chunks_exact(8)) {
        let u = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let w = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        if !(u.is_finite() && w.is_finite()) {
            return Err(IoError::corrupt(path, 0, format!("时间 {} 的帧含非有限速度值", record.time)));
        }
        *v = DVec2::new(u as f64, w as f64);
    }
    Ok(())
}

fn read_text_frame(
    file: File,
    path: &Path,
    record: &TimeRecord,
    rows: usize,
    cols: usize,
    out: &mut [DVec2],
) -> IoResult<()> {
    let reader = BufReader::new(file);
    let mut line_no = record.locator.line;
    let mut data_lines = 0usize;
    let mut reached_next = false;

    for line in reader.lines() {
        let line = line?;
        let current = line_no;
        line_no += 1;

        if is_blank_or_comment(&line) {
            continue;
        }
        if line.trim_start().starts_with('[') {
            reached_next = true;
            break;
        }

        let (row, col, v) = parse_data_line(&line)
            .ok_or_else(|| IoError::corrupt(path, current, format!("无法解析数据行 '{}'", line.trim())))?;

        if row == 0 || row > rows || col == 0 || col > cols {
            return Err(IoError::corrupt(
                path,
                current,
                format!("节点 ({row}, {col}) 超出 {rows} x {cols} 网格"),
            ));
        }
        out[(row - 1) * cols + (col - 1)] = v;
        data_lines += 1;
    }

    if data_lines == 0 && !reached_next {
        return Err(IoError::corrupt(
            path,
            record.locator.line,
            format!("时间 {} 的帧在文件末尾被截断", record.time),
        ));
    }

    Ok(())
}

/// 解析 `row col u v`
fn parse_data_line(line: &str) -> Option<(usize, usize, DVec2)> {
    let mut parts = line.split_whitespace();
    let row: usize = parts.next()?.parse().ok()?;
    let col: usize = parts.next()?.parse().ok()?;
    let u: f64 = parts.next()?.parse().ok()?;
    let v: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(u.is_finite() && v.is_finite()) {
        return None;
    }
    Some((row, col, DVec2::new(u, v)))
}
