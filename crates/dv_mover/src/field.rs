// crates/dv_mover/src/field.rs

//! 格点速度场
//!
//! 持有网格几何和当前区间的帧对，回答 (x, y, t) 的速度查询。
//! 查询只读：所有帧加载都在区间设置时完成，查询路径从不加载数据，
//! 因此可以在多个线程间共享同一个场做并行查询。

use dv_foundation::{DvError, DvResult};
use dv_mesh::GridGeometry;
use glam::DVec2;

use crate::frame::TimeFrame;
use crate::interp::TimeInterpolator;
use crate::loaded::LoadedData;

/// 格点速度场
#[derive(Debug)]
pub struct GridVelocityField {
    geometry: GridGeometry,
    loaded: LoadedData,
    interpolator: TimeInterpolator,
    /// 步进优化：预先按时间混合好的帧
    blended: Option<TimeFrame>,
    /// 混合帧缓冲区（失效后保留容量）
    blend_buffer: Vec<DVec2>,
}

impl GridVelocityField {
    /// 创建速度场
    pub fn new(geometry: GridGeometry, interpolator: TimeInterpolator) -> Self {
        Self {
            geometry,
            loaded: LoadedData::new(),
            interpolator,
            blended: None,
            blend_buffer: Vec::new(),
        }
    }

    /// 网格几何
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// 驻留帧对
    pub fn loaded(&self) -> &LoadedData {
        &self.loaded
    }

    /// 可变的驻留帧对（区间切换时使用）
    pub fn loaded_mut(&mut self) -> &mut LoadedData {
        self.invalidate_blend();
        &mut self.loaded
    }

    /// 时间插值器
    pub fn interpolator(&self) -> TimeInterpolator {
        self.interpolator
    }

    /// 是否已有预混合帧
    pub fn has_blended(&self) -> bool {
        self.blended.is_some()
    }

    /// 预先计算 `time` 时刻的混合帧
    ///
    /// 之后对同一时刻的查询只做空间插值。
    pub fn prepare_blend(&mut self, time: f64) -> DvResult<()> {
        let mut out = match self.blended.take() {
            Some(frame) => frame.values,
            None => std::mem::take(&mut self.blend_buffer),
        };

        match (self.loaded.start(), self.loaded.end()) {
            (Some(a), Some(b)) => {
                let f = self.interpolator.fraction(a.time, b.time, time);
                self.interpolator.blend_into(&a.values, &b.values, f, &mut out);
            }
            (Some(a), None) => {
                out.clear();
                out.extend_from_slice(&a.values);
            }
            _ => {
                self.blend_buffer = out;
                return Err(not_loaded(time));
            }
        }

        self.blended = Some(TimeFrame::new(time, out));
        Ok(())
    }

    /// 丢弃预混合帧
    pub fn invalidate_blend(&mut self) {
        if let Some(frame) = self.blended.take() {
            self.blend_buffer = frame.values;
        }
    }

    /// 查询 `p` 点在 `time` 时刻的速度 [m/s]，未乘缩放系数
    ///
    /// 点在网格外时返回网格外错误，不改变任何状态。
    pub fn velocity_at(&self, p: DVec2, time: f64) -> DvResult<DVec2> {
        if let Some(frame) = self.blended.as_ref().filter(|f| f.time == time) {
            return self.geometry.interpolate(&frame.values, p);
        }

        match (self.loaded.start(), self.loaded.end()) {
            (Some(a), Some(b)) => {
                let location = self
                    .geometry
                    .locate(p)
                    .ok_or_else(|| DvError::off_grid(p.x, p.y))?;
                let v0 = location.apply(&a.values);
                let v1 = location.apply(&b.values);
                let f = self.interpolator.fraction(a.time, b.time, time);
                Ok(self.interpolator.blend(v0, v1, f))
            }
            (Some(a), None) => self.geometry.interpolate(&a.values, p),
            _ => Err(not_loaded(time)),
        }
    }
}

fn not_loaded(time: f64) -> DvError {
    DvError::invalid_input(format!("时间 {time} 的区间尚未加载"))
}
