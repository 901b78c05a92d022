// crates/dv_io/src/scan.rs

//! 文件扫描
//!
//! 解析文件头并建立时间记录索引，不加载任何速度数据。
//! 支持三种来源：单个文本文件、多文件引用列表、二进制文件。

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::binary::{BinaryHeader, BINARY_MAGIC};
use crate::error::{IoError, IoResult};
use crate::file_list::{read_input_file_names, InputFileInfo};
use crate::header::{read_header_lines, FieldHeader};
use crate::index::{RecordLocator, TimeRecord, TimeRecordIndex};
use crate::sniff::{is_blank_or_comment, strip_keyword};
use crate::time::{format_model_time, parse_day_month_year};

/// 场文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// 单个文本文件
    Text,
    /// 多文件引用列表
    FileList,
    /// 二进制文件
    Binary,
}

/// 扫描结果
#[derive(Debug, Clone)]
pub struct FieldScan {
    /// 被扫描的文件
    pub path: PathBuf,
    /// 文件格式
    pub format: FieldFormat,
    /// 文件头
    pub header: FieldHeader,
    /// 时间记录索引
    pub index: TimeRecordIndex,
    /// 子文件列表（仅多文件引用时非空）
    pub input_files: Vec<InputFileInfo>,
}

impl FieldScan {
    /// 记录所在的实际文件
    pub fn record_path(&self, locator: &RecordLocator) -> IoResult<&Path> {
        match locator.file {
            None => Ok(&self.path),
            Some(i) => self
                .input_files
                .get(i)
                .map(|f| f.path.as_path())
                .ok_or_else(|| IoError::corrupt(&self.path, 0, format!("子文件序号 {i} 越界"))),
        }
    }

    /// 引用的文件数量（单文件为 1）
    pub fn file_count(&self) -> usize {
        self.input_files.len().max(1)
    }
}

/// 一行文本及其字节范围
pub(crate) struct SourceLine<'a> {
    pub text: &'a str,
    /// 下一行的起始偏移
    pub next_offset: u64,
}

/// 按行切分，记录每行结束后的字节偏移
pub(crate) fn split_lines(content: &str) -> Vec<SourceLine<'_>> {
    let mut offset = 0u64;
    content
        .split_inclusive('\n')
        .map(|raw| {
            offset += raw.len() as u64;
            SourceLine {
                text: raw.trim_end_matches(&['\n', '\r'][..]),
                next_offset: offset,
            }
        })
        .collect()
}

/// 扫描场文件，建立时间索引
pub fn scan_file_for_times(path: &Path) -> IoResult<FieldScan> {
    let mut file = IoError::open(path)?;
    let mut magic = [0u8; 4];
    let is_binary = file.read_exact(&mut magic).is_ok() && magic == BINARY_MAGIC;

    let scan = if is_binary {
        file.seek(SeekFrom::Start(0))?;
        scan_binary(file, path)?
    } else {
        drop(file);
        scan_text(path)?
    };

    if scan.index.is_empty() {
        return Err(IoError::NoRecords {
            file: path.to_path_buf(),
        });
    }

    if let Some((start, end)) = scan.index.time_range() {
        info!(
            "扫描 {} 完成: {} 条时间记录, {} 个文件, {} ~ {}",
            path.display(),
            scan.index.len(),
            scan.file_count(),
            format_model_time(start),
            format_model_time(end)
        );
    }

    Ok(scan)
}

fn scan_text(path: &Path) -> IoResult<FieldScan> {
    let content = fs::read_to_string(path)?;
    let lines = split_lines(&content);
    let texts: Vec<&str> = lines.iter().map(|l| l.text).collect();

    let (header, body_start) = read_header_lines(&texts, path)?;

    let is_list = texts
        .get(body_start)
        .is_some_and(|l| strip_keyword(l, "[FILE]").is_some());

    if !is_list {
        let records = collect_time_records(&lines, body_start, None, path)?;
        return Ok(FieldScan {
            path: path.to_path_buf(),
            format: FieldFormat::Text,
            header,
            index: TimeRecordIndex::from_records(records),
            input_files: Vec::new(),
        });
    }

    let input_files = read_input_file_names(&texts, body_start, path)?;
    let mut records = Vec::new();

    for (i, info) in input_files.iter().enumerate() {
        let sub_content = fs::read_to_string(&info.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound {
                path: info.path.clone(),
            },
            _ => IoError::Io(e),
        })?;
        let sub_lines = split_lines(&sub_content);
        let sub_texts: Vec<&str> = sub_lines.iter().map(|l| l.text).collect();
        let (sub_header, sub_body) = read_header_lines(&sub_texts, &info.path)?;

        if sub_header.kind != header.kind || !sub_header.geometry.same_shape(&header.geometry) {
            return Err(IoError::GeometryMismatch {
                file: info.path.clone(),
            });
        }
        if let (Some(a), Some(b)) = (sub_header.declared_units, header.declared_units) {
            if a != b {
                return Err(IoError::header(
                    &info.path,
                    1,
                    format!("子文件单位 {a} 与列表文件单位 {b} 不一致"),
                ));
            }
        }

        let sub_records = collect_time_records(&sub_lines, sub_body, Some(i), &info.path)?;
        check_declared_range(info, &sub_records);
        debug!("子文件 {}: {} 条时间记录", info.path.display(), sub_records.len());
        records.extend(sub_records);
    }

    Ok(FieldScan {
        path: path.to_path_buf(),
        format: FieldFormat::FileList,
        header,
        index: TimeRecordIndex::from_records(records),
        input_files,
    })
}

/// 收集正文中的 `[TIME]` 记录（数据行在加载时才解析）
fn collect_time_records(
    lines: &[SourceLine<'_>],
    body_start: usize,
    file: Option<usize>,
    path: &Path,
) -> IoResult<Vec<TimeRecord>> {
    let mut records = Vec::new();

    for (i, line) in lines.iter().enumerate().skip(body_start) {
        if is_blank_or_comment(line.text) {
            continue;
        }
        if let Some(rest) = strip_keyword(line.text, "[TIME]") {
            let time = parse_day_month_year(rest).ok_or_else(|| IoError::TimeStamp {
                file: path.to_path_buf(),
                line: i + 1,
                text: line.text.trim().to_string(),
            })?;
            records.push(TimeRecord {
                time,
                locator: RecordLocator {
                    file,
                    offset: line.next_offset,
                    line: i + 2,
                },
            });
        } else if line.text.trim_start().starts_with('[') {
            return Err(IoError::header(
                path,
                i + 1,
                format!("正文中出现无法识别的关键字: '{}'", line.text.trim()),
            ));
        }
    }

    Ok(records)
}

fn check_declared_range(info: &InputFileInfo, records: &[TimeRecord]) {
    let outside = records.iter().any(|r| {
        info.start_time.is_some_and(|s| r.time < s) || info.end_time.is_some_and(|e| r.time > e)
    });
    if outside {
        warn!("子文件 {} 的时间记录超出其声明的起止时间", info.path.display());
    }
}

fn scan_binary<R: Read + Seek>(mut reader: R, path: &Path) -> IoResult<FieldScan> {
    let header = BinaryHeader::read(&mut reader, path)?;

    let actual = reader.seek(SeekFrom::End(0))?;
    let expected = header
        .expected_len()
        .ok_or_else(|| IoError::corrupt(path, 0, "文件头声明的数据长度溢出"))?;
    if actual < expected {
        return Err(IoError::Truncated {
            file: path.to_path_buf(),
            expected,
            actual,
        });
    }

    let mut records = Vec::with_capacity(header.frame_count as usize);
    let mut buf = [0u8; 8];
    for i in 0..header.frame_count as usize {
        let offset = header
            .frame_offset(i)
            .ok_or_else(|| IoError::corrupt(path, 0, format!("第 {i} 帧偏移溢出")))?;
        reader.seek(SeekFrom::Start(offset))?;
        reader.read_exact(&mut buf)?;
        records.push(TimeRecord {
            time: f64::from_le_bytes(buf),
            locator: RecordLocator {
                file: None,
                offset: offset + 8,
                line: 0,
            },
        });
    }

    Ok(FieldScan {
        path: path.to_path_buf(),
        format: FieldFormat::Binary,
        header: FieldHeader {
            kind: header.kind,
            declared_units: header.units,
            geometry: header.geometry,
        },
        index: TimeRecordIndex::from_records(records),
        input_files: Vec::new(),
    })
}
