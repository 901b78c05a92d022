// crates/dv_mover/src/frame.rs

//! 时间帧

use glam::DVec2;

/// 一个时间点上全部网格节点的速度 [m/s]
///
/// 加载后不再修改；缓冲区由 [`LoadedData`](crate::LoadedData) 独占。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeFrame {
    /// 模型时间 [s]
    pub time: f64,
    /// 节点速度，行优先
    pub values: Vec<DVec2>,
}

impl TimeFrame {
    /// 创建时间帧
    pub fn new(time: f64, values: Vec<DVec2>) -> Self {
        Self { time, values }
    }

    /// 节点数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
