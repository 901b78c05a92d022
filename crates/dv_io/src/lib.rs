// crates/dv_io/src/lib.rs

//! DriftVel IO 模块
//!
//! 读取格点时变速度场文件，建立时间记录索引，并按需加载单个时间帧。
//!
//! # 模块
//!
//! - [`sniff`]: 文件类型嗅探（纯函数，不修改任何状态）
//! - [`header`]: 文本文件头解析，构建网格几何
//! - [`time`]: 时间戳解析与格式化
//! - [`index`]: 有序时间记录索引
//! - [`file_list`]: 多文件引用列表与文件集指纹
//! - [`scan`]: 扫描文件建立时间索引
//! - [`frame`]: 读取单个时间帧
//! - [`binary`]: 二进制场文件格式
//! - [`record`]: mover 配置的二进制持久化
//! - [`error`]: IO 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use dv_io::{scan_file_for_times, read_time_data};
//!
//! let scan = scan_file_for_times(Path::new("bay.cur"))?;
//! let mut values = Vec::new();
//! let time = read_time_data(&scan, 0, &mut values)?;
//! ```

pub mod binary;
pub mod error;
pub mod file_list;
pub mod frame;
pub mod header;
pub mod index;
pub mod record;
pub mod scan;
pub mod sniff;
pub mod time;

// 重导出常用类型
pub use binary::{write_binary_field, BinaryHeader, BINARY_MAGIC};
pub use error::{IoError, IoResult};
pub use file_list::{read_input_file_names, FileSetFingerprint, InputFileInfo};
pub use frame::read_time_data;
pub use header::{read_header_lines, FieldHeader};
pub use index::{IndexPosition, RecordLocator, TimeRecord, TimeRecordIndex};
pub use record::{read_mover_record, write_mover_record, RECORD_MAGIC, RECORD_VERSION};
pub use scan::{scan_file_for_times, FieldFormat, FieldScan};
pub use sniff::{is_grid_cur_time_file, is_grid_wind_time_file, sniff_lines, sniff_path, Sniffed};
