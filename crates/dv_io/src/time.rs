// crates/dv_io/src/time.rs

//! 时间戳解析
//!
//! 模型时间统一为自 Unix 纪元起的秒数（UTC，`f64`）。
//!
//! 场文件中的时间戳格式为 `day month year hour minute`：
//!
//! ```text
//! [TIME] 14 2 2000 10 00
//! ```
//!
//! 两位数年份：小于 40 视为 20xx，否则视为 19xx。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 从日历字段构造模型时间
pub fn model_time_from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<f64> {
    let year = match year {
        0..=39 => year + 2000,
        40..=99 => year + 1900,
        _ => year,
    };
    let dt = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    Some(dt.and_utc().timestamp() as f64)
}

/// 解析 `day month year hour minute` 形式的时间字段
///
/// `fields` 为关键字之后的部分，分钟缺省为 0。
pub fn parse_day_month_year(fields: &str) -> Option<f64> {
    let parts: Vec<&str> = fields.split_whitespace().collect();
    if parts.len() < 4 || parts.len() > 5 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    let hour: u32 = parts[3].parse().ok()?;
    let minute: u32 = match parts.get(4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    model_time_from_parts(year, month, day, hour, minute)
}

/// 解析命令行和场景文件中的时间
///
/// 支持 `YYYY-MM-DDTHH:MM:SS`、`YYYY-MM-DD HH:MM:SS`、`YYYY-MM-DD HH:MM`、
/// `YYYY-MM-DD`，以及直接给出的秒数。
pub fn parse_model_time(text: &str) -> Option<f64> {
    let text = text.trim().trim_end_matches('Z');
    if let Ok(secs) = text.parse::<f64>() {
        return secs.is_finite().then_some(secs);
    }

    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.and_utc().timestamp() as f64);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp() as f64)
}

/// 格式化模型时间（用于日志和命令行输出）
pub fn format_model_time(time: f64) -> String {
    let secs = time.floor() as i64;
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{time}s"),
    }
}
