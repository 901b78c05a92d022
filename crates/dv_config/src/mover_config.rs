// crates/dv_config/src/mover_config.rs

//! MoverConfig - mover 配置
//!
//! 描述一个格点时变场 mover 的全部用户设置。单位系统作为显式的
//! 配置值保存：`user_units` 为 `None` 时使用文件声明的单位，
//! 否则它必须与文件声明一致（文件未声明时直接采用）。

use dv_foundation::VelocityUnits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Mover 类型
///
/// 封闭的 mover 种类枚举，取代运行时类型标签链。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverKind {
    /// 格点时变海流
    #[default]
    GridCurrent,
    /// 格点时变风场
    GridWind,
}

impl MoverKind {
    /// 获取类型名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::GridCurrent => "GridCurrent",
            Self::GridWind => "GridWind",
        }
    }

    /// 二进制格式中的编码
    pub fn code(&self) -> u8 {
        match self {
            Self::GridCurrent => 0,
            Self::GridWind => 1,
        }
    }

    /// 从二进制编码解析
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::GridCurrent),
            1 => Some(Self::GridWind),
            _ => None,
        }
    }
}

impl fmt::Display for MoverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mover 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverConfig {
    /// 显示名称（为空时使用文件名）
    #[serde(default)]
    pub name: String,

    /// Mover 类型
    #[serde(default)]
    pub kind: MoverKind,

    /// 场文件路径
    pub path: PathBuf,

    /// 用户选择的速度单位
    #[serde(default)]
    pub user_units: Option<VelocityUnits>,

    /// 速度缩放系数（海流缩放 / 风缩放）
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// 是否允许时间外推
    #[serde(default)]
    pub allow_extrapolation: bool,

    /// 是否在步进准备时预计算时间插值后的速度帧
    #[serde(default)]
    pub optimize_for_step: bool,

    /// 是否启用
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_scale_factor() -> f64 { 1.0 }
fn default_active() -> bool { true }

impl MoverConfig {
    /// 创建默认配置
    pub fn new(kind: MoverKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: String::new(),
            kind,
            path: path.into(),
            user_units: None,
            scale_factor: default_scale_factor(),
            allow_extrapolation: false,
            optimize_for_step: false,
            active: default_active(),
        }
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置期望单位
    pub fn with_units(mut self, units: VelocityUnits) -> Self {
        self.user_units = Some(units);
        self
    }

    /// 设置缩放系数
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale_factor = scale;
        self
    }

    /// 设置时间外推
    pub fn with_extrapolation(mut self, allow: bool) -> Self {
        self.allow_extrapolation = allow;
        self
    }

    /// 设置步进优化
    pub fn with_step_optimization(mut self, optimize: bool) -> Self {
        self.optimize_for_step = optimize;
        self
    }

    /// 显示名称
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.kind.name().to_string())
    }

    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: MoverConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("path".to_string()));
        }

        if !self.scale_factor.is_finite() {
            return Err(ConfigError::invalid(
                "scale_factor",
                self.scale_factor,
                "缩放系数必须为有限值",
            ));
        }

        Ok(())
    }

    /// 保存配置到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}
