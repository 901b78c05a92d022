// crates/dv_mover/src/loaded.rs

//! 驻留帧对
//!
//! 每个 mover 最多同时驻留两帧：区间起点和终点。
//! 区间前移时旧终点直接成为新起点，只需加载一帧；
//! 被淘汰的帧缓冲区放回缓冲池，供下一次加载复用。

use dv_foundation::DvResult;
use glam::DVec2;

use crate::frame::TimeFrame;

/// 时间区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// 相邻两条记录
    Between(usize, usize),
    /// 单条记录（稳态场或外推到边界帧）
    Single(usize),
}

impl Bracket {
    /// 区间需要的记录序号
    pub fn indices(&self) -> [Option<usize>; 2] {
        match *self {
            Self::Between(a, b) => [Some(a), Some(b)],
            Self::Single(a) => [Some(a), None],
        }
    }
}

/// 驻留帧
#[derive(Debug, Clone)]
struct ResidentFrame {
    index: usize,
    frame: TimeFrame,
}

/// 当前区间的帧对
#[derive(Debug, Default)]
pub struct LoadedData {
    slots: [Option<ResidentFrame>; 2],
    pool: Vec<Vec<DVec2>>,
}

impl LoadedData {
    /// 创建空的帧对
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前区间（未加载时为 `None`）
    pub fn bracket(&self) -> Option<Bracket> {
        match (&self.slots[0], &self.slots[1]) {
            (Some(a), Some(b)) => Some(Bracket::Between(a.index, b.index)),
            (Some(a), None) => Some(Bracket::Single(a.index)),
            _ => None,
        }
    }

    /// 区间起点帧
    pub fn start(&self) -> Option<&TimeFrame> {
        self.slots[0].as_ref().map(|r| &r.frame)
    }

    /// 区间终点帧
    pub fn end(&self) -> Option<&TimeFrame> {
        self.slots[1].as_ref().map(|r| &r.frame)
    }

    /// 驻留帧数
    pub fn resident_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// 缓冲池中保留的缓冲区数
    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// 释放全部帧缓冲区并重置区间
    pub fn dispose(&mut self) {
        self.slots = [None, None];
        self.pool = Vec::new();
    }

    /// 重置区间但保留缓冲区容量
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if let Some(resident) = slot.take() {
                self.pool.push(resident.frame.values);
            }
        }
    }

    /// 切换到新区间
    ///
    /// 已驻留且仍需要的帧原样保留，其余帧由 `load` 读入。`load` 把第
    /// `index` 条记录的速度写入给定缓冲区并返回帧时间。加载失败时帧对
    /// 被清空（不保留半个区间）。
    pub fn install<F>(&mut self, bracket: Bracket, mut load: F) -> DvResult<()>
    where
        F: FnMut(usize, &mut Vec<DVec2>) -> DvResult<f64>,
    {
        if self.bracket() == Some(bracket) {
            return Ok(());
        }

        let mut old = [self.slots[0].take(), self.slots[1].take()];
        let wanted = bracket.indices();
        let mut next: [Option<ResidentFrame>; 2] = [None, None];

        for (slot, want) in next.iter_mut().zip(wanted) {
            let Some(want) = want else { continue };
            if let Some(reused) = old
                .iter_mut()
                .find(|r| r.as_ref().is_some_and(|r| r.index == want))
            {
                *slot = reused.take();
            }
        }

        for evicted in old.into_iter().flatten() {
            self.pool.push(evicted.frame.values);
        }

        for (k, want) in wanted.into_iter().enumerate() {
            let Some(index) = want else { continue };
            if next[k].is_some() {
                continue;
            }
            let mut values = self.pool.pop().unwrap_or_default();
            match load(index, &mut values) {
                Ok(time) => {
                    next[k] = Some(ResidentFrame {
                        index,
                        frame: TimeFrame::new(time, values),
                    })
                }
                Err(e) => {
                    self.pool.push(values);
                    for resident in next.into_iter().flatten() {
                        self.pool.push(resident.frame.values);
                    }
                    return Err(e);
                }
            }
        }

        self.slots = next;
        Ok(())
    }
}
