// crates/dv_mover/src/mover/current.rs

//! 格点时变海流 mover

use dv_config::{MoverConfig, MoverKind};
use dv_foundation::DvResult;
use dv_mesh::WorldPoint3D;

use super::grid::{displacement, GridMoverCore};
use super::Mover;
use crate::particle::LeRecord;

/// 格点时变海流 mover
///
/// 位移 = 海流速度 × 缩放系数 × 步长。
#[derive(Debug)]
pub struct GridCurrentMover {
    core: GridMoverCore,
}

impl GridCurrentMover {
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

impl Mover for GridCurrentMover {
    fn class_id(&self) -> MoverKind {
        MoverKind::GridCurrent
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
        if !self.core.config().active || !le.is_movable() {
            return Ok(WorldPoint3D::ZERO);
        }
        let v = self.core.scaled_velocity(le.position.p, model_time)?;
        Ok(displacement(&le.position, v, time_step))
    }

    fn model_step_is_done(&mut self) {
        self.core.step_done();
    }
}
