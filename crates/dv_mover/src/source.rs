// crates/dv_mover/src/source.rs

//! 时变场数据源
//!
//! 文件扫描、区间选择和帧加载的状态机：
//!
//! ```text
//! Unscanned --check_and_scan_file--> Indexed --set_interval--> Bracketed
//! ```
//!
//! 状态由持有的数据推导：没有扫描结果为 `Unscanned`；有扫描结果但
//! 没有驻留帧为 `Indexed`；否则为 `Bracketed`。单位换算系数在扫描时
//! 一次性确定，加载的帧已换算为 m/s。

use dv_config::{MoverConfig, MoverKind};
use dv_foundation::{require, DvError, DvResult, VelocityUnits};
use dv_io::{
    read_time_data, scan_file_for_times, FieldFormat, FieldScan, FileSetFingerprint, IndexPosition,
};
use dv_mesh::{GridGeometry, WorldRect};
use glam::DVec2;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::field::GridVelocityField;
use crate::interp::TimeInterpolator;
use crate::loaded::Bracket;

/// 扫描状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// 未建立时间索引
    Unscanned,
    /// 已建立索引，未加载帧
    Indexed,
    /// 已加载覆盖当前时间的帧
    Bracketed,
}

/// 区间检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalCheck {
    /// 当前区间仍覆盖查询时间
    Valid,
    /// 需要加载新区间
    NeedsLoad(Bracket),
}

/// 确定实际使用的速度单位
///
/// 文件声明了单位时以文件为准，用户设置必须与之一致；
/// 文件未声明时使用用户设置；两者都没有则无法确定。
pub fn resolve_units(
    declared: Option<VelocityUnits>,
    user: Option<VelocityUnits>,
) -> DvResult<VelocityUnits> {
    match (declared, user) {
        (Some(d), Some(u)) if d != u => Err(DvError::unit_mismatch(d.token(), u.token())),
        (Some(d), _) => Ok(d),
        (None, Some(u)) => Ok(u),
        (None, None) => Err(DvError::config("文件未声明速度单位，且未设置 user_units")),
    }
}

/// 格点时变场数据源
#[derive(Debug)]
pub struct GridTimeSource {
    path: PathBuf,
    kind: MoverKind,
    user_units: Option<VelocityUnits>,
    interpolator: TimeInterpolator,
    scan: Option<FieldScan>,
    fingerprint: Option<FileSetFingerprint>,
    field: Option<GridVelocityField>,
    units: Option<VelocityUnits>,
    conversion: f64,
}

impl GridTimeSource {
    /// 从 mover 配置创建（未扫描）
    pub fn new(config: &MoverConfig) -> Self {
        Self {
            path: config.path.clone(),
            kind: config.kind,
            user_units: config.user_units,
            interpolator: TimeInterpolator::new(config.allow_extrapolation),
            scan: None,
            fingerprint: None,
            field: None,
            units: None,
            conversion: 1.0,
        }
    }

    /// 场文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前状态
    pub fn state(&self) -> ScanState {
        match (&self.scan, &self.field) {
            (None, _) => ScanState::Unscanned,
            (Some(_), Some(field)) if field.loaded().bracket().is_some() => ScanState::Bracketed,
            (Some(_), _) => ScanState::Indexed,
        }
    }

    /// 扫描结果
    pub fn scan(&self) -> Option<&FieldScan> {
        self.scan.as_ref()
    }

    /// 速度场
    pub fn field(&self) -> Option<&GridVelocityField> {
        self.field.as_ref()
    }

    /// 速度场（可变）
    pub fn field_mut(&mut self) -> Option<&mut GridVelocityField> {
        self.field.as_mut()
    }

    /// 扫描时确定的速度单位
    pub fn units(&self) -> Option<VelocityUnits> {
        self.units
    }

    /// 文件单位到 m/s 的换算系数
    pub fn conversion(&self) -> f64 {
        self.conversion
    }

    /// 时间记录数（未扫描时为 0）
    pub fn time_count(&self) -> usize {
        self.scan.as_ref().map_or(0, |s| s.index.len())
    }

    /// 引用的文件数（未扫描时为 0）
    pub fn file_count(&self) -> usize {
        self.scan.as_ref().map_or(0, |s| s.file_count())
    }

    /// 网格边界（未扫描时为 `None`）
    pub fn grid_bounds(&self) -> Option<WorldRect> {
        self.field.as_ref().map(|f| f.geometry().bounds())
    }

    /// 网格几何
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.field.as_ref().map(|f| f.geometry())
    }

    /// 确保时间索引可用
    ///
    /// 首次调用时扫描文件；多文件引用的文件集发生变化时重新扫描。
    /// 扫描失败不改变已有状态，下一次调用会重试。
    pub fn check_and_scan_file(&mut self, model_time: f64) -> DvResult<()> {
        let rescan = match (&self.scan, &self.fingerprint) {
            (None, _) => false,
            (Some(scan), Some(fp)) if scan.format == FieldFormat::FileList => {
                if !fp.has_changed() {
                    return Ok(());
                }
                true
            }
            (Some(_), _) => return Ok(()),
        };

        if rescan {
            warn!("{} 引用的文件集已变化，重新扫描 (t = {})", self.path.display(), model_time);
        } else {
            debug!("首次扫描 {} (t = {})", self.path.display(), model_time);
        }

        let scan = scan_file_for_times(&self.path)?;

        if scan.header.kind != self.kind {
            return Err(DvError::config(format!(
                "{} 是 {} 场文件，与 mover 类型 {} 不符",
                self.path.display(),
                scan.header.kind,
                self.kind
            )));
        }
        let units = resolve_units(scan.header.declared_units, self.user_units)?;

        match self.field.as_mut() {
            Some(field) if field.geometry().same_shape(&scan.header.geometry) => {
                // 索引已变，原有帧序号失效
                field.loaded_mut().clear();
            }
            Some(_) => {
                return Err(DvError::format(
                    &self.path,
                    0,
                    "重新扫描后网格定义发生变化",
                ))
            }
            None => {
                self.field = Some(GridVelocityField::new(
                    scan.header.geometry.clone(),
                    self.interpolator,
                ));
            }
        }

        self.fingerprint = (scan.format == FieldFormat::FileList)
            .then(|| FileSetFingerprint::capture(&scan.path, &scan.input_files));
        self.units = Some(units);
        self.conversion = units.to_meters_per_second();
        self.scan = Some(scan);
        Ok(())
    }

    /// 覆盖 `model_time` 的区间
    ///
    /// 只有一条记录的文件视为稳态场。超出覆盖范围时，允许外推则
    /// 取最近的边界帧，否则返回时间范围错误。
    pub fn bracket_for(&self, model_time: f64) -> DvResult<Bracket> {
        let scan = self.require_scan()?;
        let index = &scan.index;
        let n = index.len();

        if n == 1 {
            return Ok(Bracket::Single(0));
        }

        let out_of_range = |edge: usize| {
            if self.interpolator.allow_extrapolation {
                Ok(Bracket::Single(edge))
            } else {
                let (start, end) = index.time_range().unwrap_or((f64::NAN, f64::NAN));
                Err(DvError::time_range(model_time, start, end))
            }
        };

        match index.position(model_time) {
            IndexPosition::Exact(i) if i + 1 < n => Ok(Bracket::Between(i, i + 1)),
            IndexPosition::Exact(i) => Ok(Bracket::Between(i - 1, i)),
            IndexPosition::Between(a, b) => Ok(Bracket::Between(a, b)),
            IndexPosition::Before => out_of_range(0),
            IndexPosition::After => out_of_range(n - 1),
        }
    }

    /// 当前区间是否仍覆盖 `model_time`
    pub fn check_interval(&self, model_time: f64) -> DvResult<IntervalCheck> {
        let wanted = self.bracket_for(model_time)?;
        let current = self.field.as_ref().and_then(|f| f.loaded().bracket());
        if current == Some(wanted) {
            Ok(IntervalCheck::Valid)
        } else {
            Ok(IntervalCheck::NeedsLoad(wanted))
        }
    }

    /// 加载覆盖 `model_time` 的区间
    ///
    /// 已驻留且仍需要的帧不重新读取；加载失败时不保留任何区间。
    pub fn set_interval(&mut self, model_time: f64) -> DvResult<()> {
        let bracket = match self.check_interval(model_time)? {
            IntervalCheck::Valid => return Ok(()),
            IntervalCheck::NeedsLoad(bracket) => bracket,
        };

        let conversion = self.conversion;
        let scan = self
            .scan
            .as_ref()
            .ok_or_else(|| DvError::invalid_input("数据源尚未扫描"))?;
        let field = self
            .field
            .as_mut()
            .ok_or_else(|| DvError::invalid_input("数据源尚未扫描"))?;

        debug!("{}: 切换到区间 {:?} (t = {})", self.path.display(), bracket, model_time);

        field.loaded_mut().install(bracket, |index, buf| {
            let time = read_time_data(scan, index, buf)?;
            if conversion != 1.0 {
                for v in buf.iter_mut() {
                    *v *= conversion;
                }
            }
            Ok(time)
        })
    }

    /// 查询速度 [m/s]（不含缩放系数）
    pub fn velocity_at(&self, p: DVec2, model_time: f64) -> DvResult<DVec2> {
        self.field
            .as_ref()
            .ok_or_else(|| DvError::invalid_input("数据源尚未扫描"))?
            .velocity_at(p, model_time)
    }

    /// 释放驻留帧，保留索引
    pub fn dispose_loaded_data(&mut self) {
        if let Some(field) = self.field.as_mut() {
            field.loaded_mut().dispose();
        }
    }

    /// 重置区间，保留缓冲区容量
    pub fn clear_loaded_data(&mut self) {
        if let Some(field) = self.field.as_mut() {
            field.loaded_mut().clear();
        }
    }

    fn require_scan(&self) -> DvResult<&FieldScan> {
        let scan = require!(
            self.scan.as_ref(),
            DvError::invalid_input(format!("{} 尚未扫描", self.path.display()))
        );
        Ok(scan)
    }
}
