// crates/dv_io/src/index.rs

//! 时间记录索引
//!
//! 每条记录为 (时间戳, 数据位置)。索引按时间严格递增；
//! 时间戳相同的记录以文件中较后出现者为准。

use tracing::warn;

/// 数据位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocator {
    /// 子文件序号（单文件时为 `None`）
    pub file: Option<usize>,
    /// 帧数据在文件中的字节偏移
    pub offset: u64,
    /// 帧数据首行行号（1 起；二进制文件为 0）
    pub line: usize,
}

/// 时间记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRecord {
    /// 模型时间 [s]
    pub time: f64,
    /// 数据位置
    pub locator: RecordLocator,
}

/// 查询时间在索引中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPosition {
    /// 早于第一条记录
    Before,
    /// 恰好命中一条记录
    Exact(usize),
    /// 位于两条相邻记录之间
    Between(usize, usize),
    /// 晚于最后一条记录
    After,
}

/// 有序时间记录索引
#[derive(Debug, Clone, Default)]
pub struct TimeRecordIndex {
    records: Vec<TimeRecord>,
}

impl TimeRecordIndex {
    /// 从文件顺序的记录构建索引
    ///
    /// 稳定排序后去重，重复时间戳保留文件顺序中最后一条。
    pub fn from_records(mut records: Vec<TimeRecord>) -> Self {
        records.sort_by(|a, b| a.time.total_cmp(&b.time));

        let before = records.len();
        let mut deduped: Vec<TimeRecord> = Vec::with_capacity(before);
        for record in records {
            match deduped.last_mut() {
                Some(last) if last.time == record.time => *last = record,
                _ => deduped.push(record),
            }
        }

        let dropped = before - deduped.len();
        if dropped > 0 {
            warn!("时间索引中有 {} 条重复时间戳，已保留较后的记录", dropped);
        }

        Self { records: deduped }
    }

    /// 记录数
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 获取记录
    #[inline]
    pub fn get(&self, index: usize) -> Option<&TimeRecord> {
        self.records.get(index)
    }

    /// 全部记录
    pub fn records(&self) -> &[TimeRecord] {
        &self.records
    }

    /// 第 `index` 条记录的时间
    #[inline]
    pub fn time(&self, index: usize) -> Option<f64> {
        self.records.get(index).map(|r| r.time)
    }

    /// 覆盖的时间范围
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.records.first()?.time, self.records.last()?.time))
    }

    /// 二分查找查询时间的位置
    pub fn position(&self, time: f64) -> IndexPosition {
        let k = self.records.partition_point(|r| r.time <= time);
        if k == 0 {
            return IndexPosition::Before;
        }
        if self.records[k - 1].time == time {
            return IndexPosition::Exact(k - 1);
        }
        if k == self.records.len() {
            return IndexPosition::After;
        }
        IndexPosition::Between(k - 1, k)
    }

    /// 是否严格递增
    pub fn is_strictly_ascending(&self) -> bool {
        self.records.windows(2).all(|w| w[0].time < w[1].time)
    }
}
