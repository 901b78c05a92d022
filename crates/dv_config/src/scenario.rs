// crates/dv_config/src/scenario.rs

//! ScenarioConfig - 命令行运行场景
//!
//! 一组 mover 加上起始时间、步长和初始粒子位置。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::mover_config::MoverConfig;

/// 初始粒子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSeed {
    /// 经度
    pub x: f64,
    /// 纬度
    pub y: f64,
    /// 深度 [m]
    #[serde(default)]
    pub z: f64,
    /// 风漂系数
    #[serde(default = "default_windage")]
    pub windage: f64,
}

fn default_windage() -> f64 { 0.03 }

/// 运行场景配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// 起始时间（ISO 8601，UTC）
    pub start_time: String,

    /// 时间步长 [s]
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// 步数
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Mover 列表
    #[serde(default)]
    pub movers: Vec<MoverConfig>,

    /// 初始粒子
    #[serde(default)]
    pub particles: Vec<ParticleSeed>,
}

fn default_time_step() -> f64 { 900.0 }
fn default_steps() -> usize { 96 }

impl ScenarioConfig {
    /// 从 JSON 文件加载场景
    ///
    /// mover 中的相对路径按场景文件所在目录解析。
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        let mut config: ScenarioConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if let Some(base) = path.parent() {
            for mover in &mut config.movers {
                if mover.path.is_relative() {
                    mover.path = base.join(&mover.path);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 验证场景有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_time.trim().is_empty() {
            return Err(ConfigError::Missing("start_time".to_string()));
        }

        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(ConfigError::invalid("time_step", self.time_step, "时间步长必须为正"));
        }

        for (i, mover) in self.movers.iter().enumerate() {
            mover.validate().map_err(|e| ConfigError::Parse(format!("movers[{i}]: {e}")))?;
        }

        for (i, p) in self.particles.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(ConfigError::invalid(
                    &format!("particles[{i}]"),
                    format!("({}, {}, {})", p.x, p.y, p.z),
                    "粒子坐标必须为有限值",
                ));
            }
        }

        Ok(())
    }
}
