// crates/dv_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `DvError` 枚举和 `DvResult` 类型别名，用于整个项目的错误处理。
//!
//! # 错误分类
//!
//! 所有错误都归入一个封闭的分类 [`ErrorKind`]：
//!
//! - `Format`: 文件头、时间戳或单位无法解析
//! - `Io`: 文件缺失、截断或无权限
//! - `TimeRange`: 查询时间超出文件覆盖范围（且未启用外推）
//! - `OffGrid`: 空间查询点位于网格外
//! - `Config`: 声明单位与期望单位不一致等配置问题
//!
//! 文件扫描和帧加载失败会中止当前步的准备，并以 [`StepFailure`]
//! 上报给模拟引擎；单个粒子的 `OffGrid` 错误不是致命错误。
//!
//! # 示例
//!
//! ```
//! use dv_foundation::error::{DvError, DvResult};
//!
//! fn read_units() -> DvResult<()> {
//!     Err(DvError::config("缺少单位声明"))
//! }
//! assert!(read_units().is_err());
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type DvResult<T> = Result<T, DvError>;

/// 步进失败消息的最大字节数
pub const MAX_ERROR_MESSAGE_LEN: usize = 256;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 文件格式错误
    Format,
    /// IO 错误
    Io,
    /// 时间超出范围
    TimeRange,
    /// 位置在网格外
    OffGrid,
    /// 配置错误
    Config,
}

impl ErrorKind {
    /// 获取分类名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Format => "FormatError",
            Self::Io => "IOError",
            Self::TimeRange => "TimeRangeError",
            Self::OffGrid => "OffGridError",
            Self::Config => "ConfigError",
        }
    }

    /// 该类错误是否会中止当前步
    pub fn is_fatal_for_step(&self) -> bool {
        !matches!(self, Self::OffGrid)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// DriftVel 错误类型
#[derive(Error, Debug)]
pub enum DvError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 数据截断
    #[error("数据截断: {path} 期望 {expected} 字节, 实际 {actual} 字节")]
    Truncated {
        /// 文件路径
        path: PathBuf,
        /// 期望长度
        expected: u64,
        /// 实际长度
        actual: u64,
    },

    // ========================================================================
    // 格式错误
    // ========================================================================
    /// 文件解析错误
    #[error("文件解析错误: {file} 第{line}行: {message}")]
    Format {
        /// 文件路径
        file: PathBuf,
        /// 行号（0 表示未知）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 无法识别的单位
    #[error("无法识别的速度单位: '{token}'")]
    UnknownUnits {
        /// 原始单位字符串
        token: String,
    },

    // ========================================================================
    // 时空查询错误
    // ========================================================================
    /// 时间超出文件覆盖范围
    #[error("时间 {time}s 超出数据覆盖范围 [{start}s, {end}s]")]
    TimeRange {
        /// 查询时间
        time: f64,
        /// 覆盖起始时间
        start: f64,
        /// 覆盖结束时间
        end: f64,
    },

    /// 位置在网格外
    #[error("位置 ({x}, {y}) 在网格范围之外")]
    OffGrid {
        /// x 坐标（经度）
        x: f64,
        /// y 坐标（纬度）
        y: f64,
    },

    // ========================================================================
    // 配置错误
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 单位不一致
    #[error("单位不一致: 文件声明 {declared}, 期望 {expected}")]
    UnitMismatch {
        /// 文件声明的单位
        declared: String,
        /// 配置期望的单位
        expected: String,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl DvError {
    /// 从描述创建 IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从 IO 错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 数据截断
    pub fn truncated(path: impl Into<PathBuf>, expected: u64, actual: u64) -> Self {
        Self::Truncated {
            path: path.into(),
            expected,
            actual,
        }
    }

    /// 格式错误
    pub fn format(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 无法识别的单位
    pub fn unknown_units(token: impl Into<String>) -> Self {
        Self::UnknownUnits {
            token: token.into(),
        }
    }

    /// 时间超出范围
    pub fn time_range(time: f64, start: f64, end: f64) -> Self {
        Self::TimeRange { time, start, end }
    }

    /// 位置在网格外
    pub fn off_grid(x: f64, y: f64) -> Self {
        Self::OffGrid { x, y }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 单位不一致
    pub fn unit_mismatch(declared: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnitMismatch {
            declared: declared.into(),
            expected: expected.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 获取错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } | Self::Truncated { .. } => ErrorKind::Io,
            Self::Format { .. } | Self::UnknownUnits { .. } => ErrorKind::Format,
            Self::TimeRange { .. } => ErrorKind::TimeRange,
            Self::OffGrid { .. } => ErrorKind::OffGrid,
            Self::Config { .. } | Self::UnitMismatch { .. } | Self::InvalidInput { .. } => {
                ErrorKind::Config
            }
        }
    }

    /// 是否为网格外错误（粒子查询中视为零贡献）
    #[inline]
    pub fn is_off_grid(&self) -> bool {
        matches!(self, Self::OffGrid { .. })
    }

    /// 转换为步进失败报告
    pub fn to_step_failure(&self) -> StepFailure {
        StepFailure::new(self.kind(), self.to_string())
    }
}

// ========================================================================
// 步进失败报告
// ========================================================================

/// 步进准备失败报告
///
/// 错误分类加上截断到 [`MAX_ERROR_MESSAGE_LEN`] 字节的可读消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// 错误分类
    pub kind: ErrorKind,
    /// 可读消息
    pub message: String,
}

impl StepFailure {
    /// 创建报告，消息超长时按字符边界截断
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.len() > MAX_ERROR_MESSAGE_LEN {
            let mut end = MAX_ERROR_MESSAGE_LEN;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        Self { kind, message }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl From<&DvError> for StepFailure {
    fn from(err: &DvError) -> Self {
        err.to_step_failure()
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for DvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 断言宏
// ========================================================================

/// 条件不满足时返回给定错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

/// 取出 `Option` 中的值，为 `None` 时返回给定错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
