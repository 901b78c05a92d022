// crates/dv_mover/src/mover/wind.rs

//! 格点时变风场 mover

use dv_config::{MoverConfig, MoverKind};
use dv_foundation::DvResult;
use dv_mesh::WorldPoint3D;

use super::grid::{displacement, GridMoverCore};
use super::Mover;
use crate::particle::LeRecord;

/// 格点时变风场 mover
///
/// 位移 = 风速 × 风缩放系数 × 粒子风漂系数 × 随机扰动因子 × 步长，只作用于水面粒子。
/// 随机扰动因子由调用方每步写入 [`LeRecord::windage_factor`]。
#[derive(Debug)]
pub struct GridWindMover {
    core: GridMoverCore,
}

impl GridWindMover {
    /// 从配置创建
    pub fn new(config: MoverConfig) -> Self {
        Self {
            core: GridMoverCore::new(config),
        }
    }

    /// 公共状态
    pub fn core(&self) -> &GridMoverCore {
        &self.core
    }

    /// 公共状态（可变）
    pub fn core_mut(&mut self) -> &mut GridMoverCore {
        &mut self.core
    }
}

impl Mover for GridWindMover {
    fn class_id(&self) -> MoverKind {
        MoverKind::GridWind
    }

    fn config(&self) -> &MoverConfig {
        self.core.config()
    }

    fn prepare_for_model_run(&mut self) -> DvResult<()> {
        self.core.prepare_run();
        Ok(())
    }

    fn prepare_for_model_step(&mut self, model_time: f64, _time_step: f64) -> DvResult<()> {
        self.core.prepare_step(model_time)
    }

    fn get_move(&self, le: &LeRecord, model_time: f64, time_step: f64) -> DvResult<WorldPoint3D> {
        if !self.core.config().active || !le.is_movable() || !le.at_surface() {
            return Ok(WorldPoint3D::ZERO);
        }
        let v = self.core.scaled_velocity(le.position.p, model_time)? * le.effective_windage();
        Ok(displacement(&le.position, v, time_step))
    }

    fn model_step_is_done(&mut self) {
        self.core.step_done();
    }
}
