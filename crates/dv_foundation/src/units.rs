// crates/dv_foundation/src/units.rs

//! 速度单位
//!
//! 场文件在头部声明速度单位，用户也可以在配置中指定期望单位。
//! 单位在扫描文件时一次性解析为到 m/s 的换算系数，之后随 mover
//! 配置显式传递，不存在全局单位状态。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 速度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityUnits {
    /// 米每秒
    MetersPerSecond,
    /// 厘米每秒
    CentimetersPerSecond,
    /// 节（海里每小时）
    Knots,
    /// 英里每小时
    MilesPerHour,
    /// 千米每小时
    KilometersPerHour,
}

impl VelocityUnits {
    /// 全部单位
    pub const ALL: [Self; 5] = [
        Self::MetersPerSecond,
        Self::CentimetersPerSecond,
        Self::Knots,
        Self::MilesPerHour,
        Self::KilometersPerHour,
    ];

    /// 从文件头中的单位记号解析（不区分大小写）
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "m/s" | "mps" | "meters/sec" | "m/sec" => Some(Self::MetersPerSecond),
            "cm/s" | "cmps" | "cm/sec" => Some(Self::CentimetersPerSecond),
            "knots" | "knot" | "kts" | "kt" => Some(Self::Knots),
            "mph" | "mi/h" | "miles/hour" => Some(Self::MilesPerHour),
            "km/h" | "kph" | "km/hr" => Some(Self::KilometersPerHour),
            _ => None,
        }
    }

    /// 到 m/s 的换算系数
    pub fn to_meters_per_second(&self) -> f64 {
        match self {
            Self::MetersPerSecond => 1.0,
            Self::CentimetersPerSecond => 0.01,
            Self::Knots => 1852.0 / 3600.0,
            Self::MilesPerHour => 0.44704,
            Self::KilometersPerHour => 1.0 / 3.6,
        }
    }

    /// 二进制格式中的编码
    pub fn code(&self) -> u8 {
        match self {
            Self::MetersPerSecond => 0,
            Self::CentimetersPerSecond => 1,
            Self::Knots => 2,
            Self::MilesPerHour => 3,
            Self::KilometersPerHour => 4,
        }
    }

    /// 从二进制编码解析
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|u| u.code() == code)
    }

    /// 文件头中使用的标准记号
    pub fn token(&self) -> &'static str {
        match self {
            Self::MetersPerSecond => "m/s",
            Self::CentimetersPerSecond => "cm/s",
            Self::Knots => "knots",
            Self::MilesPerHour => "mph",
            Self::KilometersPerHour => "km/h",
        }
    }
}

impl fmt::Display for VelocityUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(VelocityUnits::parse_token("M/S"), Some(VelocityUnits::MetersPerSecond));
        assert_eq!(VelocityUnits::parse_token(" kts "), Some(VelocityUnits::Knots));
        assert_eq!(VelocityUnits::parse_token("cmps"), Some(VelocityUnits::CentimetersPerSecond));
        assert_eq!(VelocityUnits::parse_token("furlongs/fortnight"), None);
    }

    #[test]
    fn test_token_round_trip() {
        for units in VelocityUnits::ALL {
            assert_eq!(VelocityUnits::parse_token(units.token()), Some(units));
            assert_eq!(VelocityUnits::from_code(units.code()), Some(units));
        }
        assert_eq!(VelocityUnits::from_code(200), None);
    }

    #[test]
    fn test_conversion_factors() {
        assert!((VelocityUnits::CentimetersPerSecond.to_meters_per_second() - 0.01).abs() < 1e-12);
        assert!((VelocityUnits::KilometersPerHour.to_meters_per_second() * 3.6 - 1.0).abs() < 1e-12);
        assert!((VelocityUnits::Knots.to_meters_per_second() - 0.514_444).abs() < 1e-6);
    }
}
