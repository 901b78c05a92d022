// crates/dv_mover/src/mover/mod.rs

//! Mover 接口
//!
//! 模拟引擎按以下顺序驱动每个 mover：
//!
//! ```text
//! prepare_for_model_run
//! 每一步: prepare_for_model_step -> get_move (每个粒子) -> model_step_is_done
//! ```
//!
//! 所有文件读取都发生在 `prepare_for_model_step` 中；`get_move` 只读，
//! 可以对粒子并行调用。粒子位于网格外时 `get_move` 返回网格外错误，
//! 批量接口把它视为零位移。

mod current;
mod grid;
mod wind;

pub use current::GridCurrentMover;
pub use grid::{displacement, GridMoverCore};
pub use wind::GridWindMover;

use dv_config::{MoverConfig, MoverKind};
use dv_foundation::{DvError, DvResult};
use dv_io::{read_mover_record, sniff_path, write_mover_record};
use dv_mesh::{WorldPoint3D, WorldRect};
use glam::DVec2;
use rayon::prelude::*;
use std::io::{Read, Write};
use std::path::Path;

use crate::particle::LeRecord;
use crate::source::{GridTimeSource, ScanState};

/// Mover 能力接口
pub trait Mover {
    /// Mover 类型
    fn class_id(&self) -> MoverKind;

    /// 配置
    fn config(&self) -> &MoverConfig;

    /// 模拟开始前调用
    fn prepare_for_model_run(&mut self) -> DvResult<()>;

    /// 每步开始前调用，加载覆盖 `model_time` 的数据
    fn prepare_for_model_step(&mut self, model_time: f64, time_step: f64) -> DvResult<()>;

    /// 单个粒子在本步的位移（经纬度）
    fn get_move(&self, le: &LeRecord, model_time: f64, time_step: f64) -> DvResult<WorldPoint3D>;

    /// 每步结束后调用
    fn model_step_is_done(&mut self);

    /// 批量计算位移，网格外的粒子位移为零
    fn get_moves(
        &self,
        les: &[LeRecord],
        model_time: f64,
        time_step: f64,
        out: &mut [WorldPoint3D],
    ) -> DvResult<()> {
        for (delta, le) in out.iter_mut().zip(les) {
            *delta = zero_if_off_grid(self.get_move(le, model_time, time_step))?;
        }
        Ok(())
    }

    /// 并行批量计算位移
    fn get_moves_parallel(
        &self,
        les: &[LeRecord],
        model_time: f64,
        time_step: f64,
        out: &mut [WorldPoint3D],
    ) -> DvResult<()>
    where
        Self: Sync,
    {
        out.par_iter_mut()
            .zip(les.par_iter())
            .try_for_each(|(delta, le)| {
                *delta = zero_if_off_grid(self.get_move(le, model_time, time_step))?;
                Ok(())
            })
    }
}

/// 网格外错误视为零位移
#[inline]
pub fn zero_if_off_grid(result: DvResult<WorldPoint3D>) -> DvResult<WorldPoint3D> {
    match result {
        Err(e) if e.is_off_grid() => Ok(WorldPoint3D::ZERO),
        other => other,
    }
}

/// 封闭的 mover 种类
#[derive(Debug)]
pub enum AnyMover {
    /// 海流
    Current(GridCurrentMover),
    /// 风场
    Wind(GridWindMover),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyMover::Current($m) => $body,
            AnyMover::Wind($m) => $body,
        }
    };
}

impl AnyMover {
    /// 按配置中的类型创建（未扫描）
    pub fn from_config(config: MoverConfig) -> DvResult<Self> {
        config.validate()?;
        Ok(match config.kind {
            MoverKind::GridCurrent => Self::Current(GridCurrentMover::new(config)),
            MoverKind::GridWind => Self::Wind(GridWindMover::new(config)),
        })
    }

    /// 打开场文件：嗅探类型，读取文件头，建立网格和时间索引
    pub fn from_path(path: &Path) -> DvResult<Self> {
        let sniffed = sniff_path(path).ok_or_else(|| {
            if path.exists() {
                DvError::format(path, 1, "不是格点时变海流或风场文件")
            } else {
                DvError::file_not_found(path)
            }
        })?;

        let mut mover = Self::from_config(MoverConfig::new(sniffed.kind, path))?;
        mover.source_mut().check_and_scan_file(f64::NAN)?;
        Ok(mover)
    }

    /// 从持久化记录恢复（未扫描）
    pub fn read_record<R: Read>(reader: &mut R) -> DvResult<Self> {
        let config = read_mover_record(reader)?;
        Self::from_config(config)
    }

    /// 写入持久化记录（只含配置）
    pub fn write_record<W: Write>(&self, writer: &mut W) -> DvResult<()> {
        write_mover_record(writer, self.config())?;
        Ok(())
    }

    fn core(&self) -> &GridMoverCore {
        dispatch!(self, m => m.core())
    }

    fn core_mut(&mut self) -> &mut GridMoverCore {
        dispatch!(self, m => m.core_mut())
    }

    /// 显示名称
    pub fn name(&self) -> String {
        self.config().display_name()
    }

    /// 数据源
    pub fn source(&self) -> &GridTimeSource {
        self.core().source()
    }

    /// 数据源（可变）
    pub fn source_mut(&mut self) -> &mut GridTimeSource {
        self.core_mut().source_mut()
    }

    /// 扫描状态
    pub fn state(&self) -> ScanState {
        self.source().state()
    }

    /// 时间记录数
    pub fn time_count(&self) -> usize {
        self.source().time_count()
    }

    /// 引用的文件数
    pub fn file_count(&self) -> usize {
        self.source().file_count()
    }

    /// 网格边界
    pub fn grid_bounds(&self) -> Option<WorldRect> {
        self.source().grid_bounds()
    }

    /// 更新配置
    pub fn update_config(&mut self, config: MoverConfig) -> DvResult<()> {
        self.core_mut().update_config(config)
    }

    /// 查询 `p` 点在 `model_time` 的速度 [m/s]（含缩放系数，必要时加载数据）
    pub fn velocity_at(&mut self, p: DVec2, model_time: f64) -> DvResult<DVec2> {
        self.core_mut().velocity_at(p, model_time)
    }
}

impl Mover for AnyMover {
    fn class_id(&self) -> MoverKind {
        dispatch!(self, m => m.class_id())
    }

    fn config(&self) -> &MoverConfig {
        dispatch!(self, m => m.config())
    }

    fn prepare_for_model_run(&mut self) -> DvResult<()> {
        dispatch!(self, m => m.prepare_for_model_run())
    }

    fn prepare_for_model_step(&mut self, model_time: f64, time_step: f64) -> DvResult<()> {
        dispatch!(self, m => m.prepare_for_model_step(model_time, time_step))
    }

    fn get_move(&self, le: &LeRecord, model_time: f64, time_step: f64) -> DvResult<WorldPoint3D> {
        dispatch!(self, m => m.get_move(le, model_time, time_step))
    }

    fn model_step_is_done(&mut self) {
        dispatch!(self, m => m.model_step_is_done())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_dispatch() {
        let wind = AnyMover::from_config(MoverConfig::new(MoverKind::GridWind, "w.txt")).unwrap();
        assert_eq!(wind.class_id(), MoverKind::GridWind);
        assert!(matches!(wind, AnyMover::Wind(_)));
        assert_eq!(wind.state(), ScanState::Unscanned);
        assert_eq!(wind.name(), "w.txt");

        let current = AnyMover::from_config(MoverConfig::new(MoverKind::GridCurrent, "c.cur")).unwrap();
        assert_eq!(current.class_id(), MoverKind::GridCurrent);
    }

    #[test]
    fn test_from_config_validates() {
        let config = MoverConfig::new(MoverKind::GridCurrent, "c.cur").with_scale(f64::INFINITY);
        let err = AnyMover::from_config(config).unwrap_err();
        assert_eq!(err.kind(), dv_foundation::ErrorKind::Config);
    }

    #[test]
    fn test_zero_if_off_grid() {
        let off: DvResult<WorldPoint3D> = Err(DvError::off_grid(1.0, 2.0));
        assert_eq!(zero_if_off_grid(off).unwrap(), WorldPoint3D::ZERO);

        let io: DvResult<WorldPoint3D> = Err(DvError::io("x"));
        assert!(zero_if_off_grid(io).is_err());
    }

    #[test]
    fn test_inactive_mover_does_not_move() {
        let mut config = MoverConfig::new(MoverKind::GridCurrent, "never-read.cur");
        config.active = false;
        let mut mover = AnyMover::from_config(config).unwrap();
        mover.prepare_for_model_step(0.0, 60.0).unwrap();
        let delta = mover.get_move(&LeRecord::surface(0.0, 0.0, 0.03), 0.0, 60.0).unwrap();
        assert_eq!(delta, WorldPoint3D::ZERO);
        assert_eq!(mover.state(), ScanState::Unscanned);
    }
}
