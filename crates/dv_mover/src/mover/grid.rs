// crates/dv_mover/src/mover/grid.rs

//! 格点时变场 mover 的公共部分
//!
//! 海流和风场 mover 都嵌入一个 [`GridMoverCore`]，共享扫描、区间设置、
//! 步进优化和位移换算；两者只在单个粒子的速度合成上不同。

use dv_config::MoverConfig;
use dv_foundation::{DvError, DvResult};
use dv_mesh::{meters_to_degrees, WorldPoint3D};
use glam::DVec2;
use tracing::info;

use crate::source::GridTimeSource;

/// 格点 mover 公共状态
#[derive(Debug)]
pub struct GridMoverCore {
    config: MoverConfig,
    source: GridTimeSource,
    step_time: Option<f64>,
}

impl GridMoverCore {
    /// 创建（未扫描）
    pub fn new(config: MoverConfig) -> Self {
        let source = GridTimeSource::new(&config);
        Self {
            config,
            source,
            step_time: None,
        }
    }

    /// 配置
    pub fn config(&self) -> &MoverConfig {
        &self.config
    }

    /// 数据源
    pub fn source(&self) -> &GridTimeSource {
        &self.source
    }

    /// 数据源（可变）
    pub fn source_mut(&mut self) -> &mut GridTimeSource {
        &mut self.source
    }

    /// 当前步的模型时间（步进准备完成后有效）
    pub fn step_time(&self) -> Option<f64> {
        self.step_time
    }

    /// 更新配置
    ///
    /// 路径、单位或外推设置变化时丢弃扫描结果，回到未扫描状态；
    /// 其余设置（名称、缩放、启用、步进优化）直接生效。
    pub fn update_config(&mut self, config: MoverConfig) -> DvResult<()> {
        config.validate()?;
        if config.kind != self.config.kind {
            return Err(DvError::config(format!(
                "不能把 {} mover 改为 {}",
                self.config.kind, config.kind
            )));
        }

        let needs_rescan = config.path != self.config.path
            || config.user_units != self.config.user_units
            || config.allow_extrapolation != self.config.allow_extrapolation;

        self.config = config;
        if needs_rescan {
            self.source = GridTimeSource::new(&self.config);
            self.step_time = None;
        } else if !self.config.optimize_for_step {
            self.drop_step_cache();
        }
        Ok(())
    }

    /// 模拟开始：释放上一次运行驻留的帧
    pub fn prepare_run(&mut self) {
        self.source.dispose_loaded_data();
        self.step_time = None;
        info!(
            "{} ({}) 准备运行: {}",
            self.config.display_name(),
            self.config.kind,
            self.config.path.display()
        );
    }

    /// 步进准备：确保索引可用并加载覆盖 `model_time` 的区间
    pub fn prepare_step(&mut self, model_time: f64) -> DvResult<()> {
        self.step_time = None;
        if !self.config.active {
            return Ok(());
        }

        self.source.check_and_scan_file(model_time)?;
        self.source.set_interval(model_time)?;

        if self.config.optimize_for_step {
            if let Some(field) = self.source.field_mut() {
                field.prepare_blend(model_time)?;
            }
        }

        self.step_time = Some(model_time);
        Ok(())
    }

    /// 步进结束
    pub fn step_done(&mut self) {
        self.drop_step_cache();
        self.step_time = None;
    }

    fn drop_step_cache(&mut self) {
        if let Some(field) = self.source.field_mut() {
            field.invalidate_blend();
        }
    }

    /// 已缩放的速度 [m/s]
    #[inline]
    pub fn scaled_velocity(&self, p: DVec2, model_time: f64) -> DvResult<DVec2> {
        Ok(self.source.velocity_at(p, model_time)? * self.config.scale_factor)
    }

    /// 按需加载后查询已缩放的速度（诊断用）
    pub fn velocity_at(&mut self, p: DVec2, model_time: f64) -> DvResult<DVec2> {
        self.source.check_and_scan_file(model_time)?;
        self.source.set_interval(model_time)?;
        self.scaled_velocity(p, model_time)
    }
}

/// 速度 × 步长换算为经纬度位移
#[inline]
pub fn displacement(position: &WorldPoint3D, velocity: DVec2, time_step: f64) -> WorldPoint3D {
    WorldPoint3D {
        p: meters_to_degrees(velocity * time_step, position.p.y),
        z: 0.0,
    }
}
