// crates/dv_mover/src/collection.rs

//! 多个 mover 的步进驱动
//!
//! 步进准备失败（扫描、加载、时间范围、配置）会中止当前步，
//! 以 [`StepFailure`] 报告给调用方；单个粒子的网格外查询只贡献零位移。

use dv_foundation::{DvError, StepFailure};
use dv_mesh::WorldPoint3D;
use tracing::debug;

use crate::mover::{AnyMover, Mover};
use crate::particle::LeRecord;

/// Mover 集合
#[derive(Debug, Default)]
pub struct MoverSet {
    movers: Vec<AnyMover>,
    deltas: Vec<WorldPoint3D>,
    scratch: Vec<WorldPoint3D>,
}

impl MoverSet {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加 mover
    pub fn push(&mut self, mover: AnyMover) {
        self.movers.push(mover);
    }

    /// mover 数量
    pub fn len(&self) -> usize {
        self.movers.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.movers.is_empty()
    }

    /// 全部 mover
    pub fn movers(&self) -> &[AnyMover] {
        &self.movers
    }

    /// 全部 mover（可变）
    pub fn movers_mut(&mut self) -> &mut [AnyMover] {
        &mut self.movers
    }

    /// 模拟开始
    pub fn prepare_for_model_run(&mut self) -> Result<(), StepFailure> {
        for mover in &mut self.movers {
            mover
                .prepare_for_model_run()
                .map_err(|e| step_failure(mover, &e))?;
        }
        Ok(())
    }

    /// 推进一步：准备全部 mover，累加各 mover 的位移并更新粒子位置
    ///
    /// 返回后所有 mover 都已收到 `model_step_is_done`，失败时粒子不移动。
    pub fn step(
        &mut self,
        model_time: f64,
        time_step: f64,
        les: &mut [LeRecord],
    ) -> Result<(), StepFailure> {
        let result = self.accumulate(model_time, time_step, les);
        for mover in &mut self.movers {
            mover.model_step_is_done();
        }
        result?;

        for (le, delta) in les.iter_mut().zip(&self.deltas) {
            le.position.p += delta.p;
            le.position.z += delta.z;
        }
        Ok(())
    }

    fn accumulate(
        &mut self,
        model_time: f64,
        time_step: f64,
        les: &[LeRecord],
    ) -> Result<(), StepFailure> {
        for mover in &mut self.movers {
            mover
                .prepare_for_model_step(model_time, time_step)
                .map_err(|e| step_failure(mover, &e))?;
        }

        self.deltas.clear();
        self.deltas.resize(les.len(), WorldPoint3D::ZERO);
        self.scratch.resize(les.len(), WorldPoint3D::ZERO);

        for mover in self.movers.iter().filter(|m| m.config().active) {
            mover
                .get_moves_parallel(les, model_time, time_step, &mut self.scratch)
                .map_err(|e| step_failure(mover, &e))?;
            for (total, delta) in self.deltas.iter_mut().zip(&self.scratch) {
                total.p += delta.p;
                total.z += delta.z;
            }
        }

        debug!("t = {}: {} 个 mover 作用于 {} 个粒子", model_time, self.movers.len(), les.len());
        Ok(())
    }
}

fn step_failure(mover: &AnyMover, err: &DvError) -> StepFailure {
    StepFailure::new(err.kind(), format!("{}: {}", mover.name(), err))
}
