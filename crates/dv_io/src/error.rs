// crates/dv_io/src/error.rs
//! IO 错误类型定义
//!
//! 保留文件名、行号等解析细节；所有错误都可转换为 `DvError`，
//! 并落入对应的错误分类（格式 / IO / 配置）。

use dv_foundation::DvError;
use std::path::PathBuf;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 文件头错误
    #[error("文件头错误: {file}:{line} - {message}")]
    Header {
        /// 文件路径
        file: PathBuf,
        /// 行号（1 起）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 时间戳无法解析
    #[error("无法解析时间戳: {file}:{line} '{text}'")]
    TimeStamp {
        /// 文件路径
        file: PathBuf,
        /// 行号（1 起）
        line: usize,
        /// 原始文本
        text: String,
    },

    /// 无法识别的速度单位
    #[error("无法识别的速度单位: {file} '{token}'")]
    UnknownUnits {
        /// 文件路径
        file: PathBuf,
        /// 单位记号
        token: String,
    },

    /// 魔数不匹配
    #[error("无效的文件格式: {file}")]
    BadMagic {
        /// 文件路径
        file: PathBuf,
    },

    /// 版本不兼容
    #[error("版本不兼容: 文件版本 {found}, 支持的最高版本 {supported}")]
    UnsupportedVersion {
        /// 文件版本
        found: u32,
        /// 支持的最高版本
        supported: u32,
    },

    /// 校验和错误
    #[error("校验和错误: 期望 {expected:08x}, 实际 {found:08x}")]
    Checksum {
        /// 存储的校验和
        expected: u32,
        /// 计算的校验和
        found: u32,
    },

    /// 子文件网格与主文件不一致
    #[error("网格不一致: {file} 与主文件的网格定义不同")]
    GeometryMismatch {
        /// 子文件路径
        file: PathBuf,
    },

    /// 文件中没有时间记录
    #[error("文件中没有时间记录: {file}")]
    NoRecords {
        /// 文件路径
        file: PathBuf,
    },

    /// 数据记录损坏
    #[error("数据记录损坏: {file}:{line} - {message}")]
    CorruptRecord {
        /// 文件路径
        file: PathBuf,
        /// 行号（0 表示二进制数据）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 数据截断
    #[error("数据截断: {file} 期望 {expected} 字节, 实际 {actual} 字节")]
    Truncated {
        /// 文件路径
        file: PathBuf,
        /// 期望长度
        expected: u64,
        /// 实际长度
        actual: u64,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound {
        /// 路径
        path: PathBuf,
    },

    /// 底层 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// 文件头错误
    pub fn header(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Header {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 数据记录损坏
    pub fn corrupt(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 打开文件，区分“不存在”和其他 IO 错误
    pub fn open(path: &std::path::Path) -> IoResult<std::fs::File> {
        std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            _ => Self::Io(e),
        })
    }
}

impl From<IoError> for DvError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Header { file, line, message } => DvError::format(file, line, message),
            IoError::TimeStamp { file, line, text } => {
                DvError::format(file, line, format!("无法解析时间戳 '{text}'"))
            }
            IoError::UnknownUnits { token, .. } => DvError::unknown_units(token),
            IoError::BadMagic { file } => DvError::format(file, 0, "魔数不匹配"),
            e @ IoError::UnsupportedVersion { .. } => DvError::format("", 0, e.to_string()),
            e @ IoError::Checksum { .. } => DvError::format("", 0, e.to_string()),
            IoError::GeometryMismatch { file } => {
                DvError::format(file, 0, "子文件网格与主文件不一致")
            }
            IoError::NoRecords { file } => DvError::format(file, 0, "文件中没有时间记录"),
            e @ IoError::CorruptRecord { .. } => DvError::io(e.to_string()),
            IoError::Truncated { file, expected, actual } => {
                DvError::truncated(file, expected, actual)
            }
            IoError::NotFound { path } => DvError::file_not_found(path),
            IoError::Io(e) => DvError::io_with_source("文件读写失败", e),
        }
    }
}
