// crates/dv_io/src/sniff.rs

//! 文件类型嗅探
//!
//! 只检查文件开头的签名，不解析网格、不修改任何 mover 状态，
//! 可以在选择 mover 类型之前推测性地调用。

use dv_config::MoverKind;
use dv_foundation::VelocityUnits;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::binary::BINARY_MAGIC;
use crate::error::IoError;

/// 文本文件嗅探时最多检查的行数
const SNIFF_LINES: usize = 16;

/// 海流文件签名
pub const CURRENT_KEYWORD: &str = "[GRIDCURTIME]";
/// 风场文件签名
pub const WIND_KEYWORD: &str = "[GRIDWINDTIME]";

/// 嗅探结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    /// 场类型
    pub kind: MoverKind,
    /// 文件声明的单位（未声明或无法识别时为 `None`）
    pub units: Option<VelocityUnits>,
    /// 是否为二进制文件
    pub binary: bool,
}

/// 判断一行是否以给定关键字开头（不区分大小写），返回关键字之后的部分
pub(crate) fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let line = line.trim_start();
    let head = line.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword).then(|| &line[keyword.len()..])
}

/// 是否为可忽略的行（空行或注释）
pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with('#')
}

/// 嗅探预读的文本行
///
/// 第一条非空、非注释行必须是 `[GRIDCURTIME]` 或 `[GRIDWINDTIME]`，
/// 其后可跟单位记号。
pub fn sniff_lines<S: AsRef<str>>(lines: &[S]) -> Option<Sniffed> {
    let first = lines.iter().map(AsRef::as_ref).find(|l| !is_blank_or_comment(l))?;

    let (kind, rest) = if let Some(rest) = strip_keyword(first, CURRENT_KEYWORD) {
        (MoverKind::GridCurrent, rest)
    } else if let Some(rest) = strip_keyword(first, WIND_KEYWORD) {
        (MoverKind::GridWind, rest)
    } else {
        return None;
    };

    Some(Sniffed {
        kind,
        units: VelocityUnits::parse_token(rest),
        binary: false,
    })
}

/// 嗅探磁盘文件
///
/// 文件无法读取或签名不匹配时返回 `None`。
pub fn sniff_path(path: &Path) -> Option<Sniffed> {
    let mut file = IoError::open(path).ok()?;

    let mut magic = [0u8; 4];
    let mut head = [0u8; 6];
    if file.read_exact(&mut magic).is_ok() && magic == BINARY_MAGIC {
        // version(4) + kind(1) + units(1)
        file.read_exact(&mut head).ok()?;
        let kind = MoverKind::from_code(head[4])?;
        return Some(Sniffed {
            kind,
            units: VelocityUnits::from_code(head[5]),
            binary: true,
        });
    }

    let file = IoError::open(path).ok()?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .take(SNIFF_LINES)
        .map_while(Result::ok)
        .collect();
    sniff_lines(&lines)
}

/// 是否为格点时变海流文件；是则返回声明的单位
pub fn is_grid_cur_time_file(path: &Path) -> Option<Option<VelocityUnits>> {
    sniff_path(path)
        .filter(|s| s.kind == MoverKind::GridCurrent)
        .map(|s| s.units)
}

/// 是否为格点时变风场文件；是则返回声明的单位
pub fn is_grid_wind_time_file(path: &Path) -> Option<Option<VelocityUnits>> {
    sniff_path(path)
        .filter(|s| s.kind == MoverKind::GridWind)
        .map(|s| s.units)
}
