// crates/dv_io/src/header.rs

//! 文本场文件头解析
//!
//! 文件头由签名行和六个网格关键字组成，关键字顺序任意：
//!
//! ```text
//! [GRIDCURTIME] m/s
//! NUMROWS 3
//! NUMCOLS 4
//! LOLAT 30.0
//! HILAT 31.0
//! LOLONG -120.0
//! HILONG -119.0
//! ```
//!
//! 文件头在第一个以 `[` 开头的非签名行处结束（`[TIME]` 或 `[FILE]`）。

use dv_config::MoverKind;
use dv_foundation::VelocityUnits;
use dv_mesh::{GridGeometry, WorldRect};
use std::path::Path;

use crate::error::{IoError, IoResult};
use crate::sniff::{is_blank_or_comment, sniff_lines};

/// 场文件头
#[derive(Debug, Clone)]
pub struct FieldHeader {
    /// 场类型
    pub kind: MoverKind,
    /// 文件声明的单位
    pub declared_units: Option<VelocityUnits>,
    /// 网格几何
    pub geometry: GridGeometry,
}

#[derive(Default)]
struct HeaderFields {
    rows: Option<usize>,
    cols: Option<usize>,
    lo_lat: Option<f64>,
    hi_lat: Option<f64>,
    lo_long: Option<f64>,
    hi_long: Option<f64>,
}

/// 解析文件头
///
/// 返回文件头和正文第一行的下标。`file` 仅用于错误信息。
pub fn read_header_lines<S: AsRef<str>>(lines: &[S], file: &Path) -> IoResult<(FieldHeader, usize)> {
    let sig_line = lines
        .iter()
        .position(|l| !is_blank_or_comment(l.as_ref()))
        .ok_or_else(|| IoError::header(file, 1, "文件为空"))?;

    let sniffed = sniff_lines(&lines[sig_line..=sig_line]).ok_or_else(|| {
        IoError::header(file, sig_line + 1, "缺少 [GRIDCURTIME] 或 [GRIDWINDTIME] 签名")
    })?;

    // 签名行上有单位记号但无法识别
    let declared_units = match (sniffed.units, units_token(lines[sig_line].as_ref())) {
        (Some(u), _) => Some(u),
        (None, None) => None,
        (None, Some(token)) => {
            return Err(IoError::UnknownUnits {
                file: file.to_path_buf(),
                token: token.to_string(),
            })
        }
    };

    let mut fields = HeaderFields::default();
    let mut body_start = lines.len();

    for (i, raw) in lines.iter().enumerate().skip(sig_line + 1) {
        let line = raw.as_ref().trim();
        if is_blank_or_comment(line) {
            continue;
        }
        if line.starts_with('[') {
            body_start = i;
            break;
        }

        let mut parts = line.split_whitespace();
        let key = parts.next().unwrap_or_default().to_ascii_uppercase();
        let value = parts
            .next()
            .ok_or_else(|| IoError::header(file, i + 1, format!("{key} 缺少数值")))?;

        match key.as_str() {
            "NUMROWS" => fields.rows = Some(parse_value(value, &key, file, i)?),
            "NUMCOLS" => fields.cols = Some(parse_value(value, &key, file, i)?),
            "LOLAT" => fields.lo_lat = Some(parse_value(value, &key, file, i)?),
            "HILAT" => fields.hi_lat = Some(parse_value(value, &key, file, i)?),
            "LOLONG" => fields.lo_long = Some(parse_value(value, &key, file, i)?),
            "HILONG" => fields.hi_long = Some(parse_value(value, &key, file, i)?),
            _ => return Err(IoError::header(file, i + 1, format!("未知关键字 '{key}'"))),
        }
    }

    let missing = |name: &str| IoError::header(file, body_start + 1, format!("缺少 {name}"));
    let rows = fields.rows.ok_or_else(|| missing("NUMROWS"))?;
    let cols = fields.cols.ok_or_else(|| missing("NUMCOLS"))?;
    let lo_lat = fields.lo_lat.ok_or_else(|| missing("LOLAT"))?;
    let hi_lat = fields.hi_lat.ok_or_else(|| missing("HILAT"))?;
    let lo_long = fields.lo_long.ok_or_else(|| missing("LOLONG"))?;
    let hi_long = fields.hi_long.ok_or_else(|| missing("HILONG"))?;

    let bounds = WorldRect::new(lo_long, lo_lat, hi_long, hi_lat);
    let geometry = GridGeometry::regular(rows, cols, bounds)
        .map_err(|e| IoError::header(file, sig_line + 1, e.to_string()))?;

    Ok((
        FieldHeader {
            kind: sniffed.kind,
            declared_units,
            geometry,
        },
        body_start,
    ))
}

/// 签名行上关键字之后的单位记号
fn units_token(line: &str) -> Option<&str> {
    let line = line.trim();
    let end = line.find(']')?;
    let token = line[end + 1..].trim();
    (!token.is_empty()).then_some(token)
}

fn parse_value<T: std::str::FromStr>(value: &str, key: &str, file: &Path, line: usize) -> IoResult<T> {
    value
        .parse()
        .map_err(|_| IoError::header(file, line + 1, format!("{key} 的数值无效: '{value}'")))
}
