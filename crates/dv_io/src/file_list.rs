// crates/dv_io/src/file_list.rs

//! 多文件引用列表
//!
//! 列表文件在文件头之后给出若干子文件：
//!
//! ```text
//! [FILE] sub/part1.cur
//! [STARTTIME] 14 2 2000 10 00
//! [ENDTIME] 14 2 2000 16 00
//! [FILE] sub/part2.cur
//! ```
//!
//! 相对路径按列表文件所在目录解析。`[STARTTIME]`/`[ENDTIME]` 可省略。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{IoError, IoResult};
use crate::sniff::{is_blank_or_comment, strip_keyword};
use crate::time::parse_day_month_year;

/// 子文件描述
#[derive(Debug, Clone, PartialEq)]
pub struct InputFileInfo {
    /// 子文件路径（已解析为相对于工作目录或绝对路径）
    pub path: PathBuf,
    /// 声明的起始时间
    pub start_time: Option<f64>,
    /// 声明的结束时间
    pub end_time: Option<f64>,
}

/// 解析子文件列表
///
/// `lines[start..]` 为列表正文，`list_path` 为列表文件本身的路径。
pub fn read_input_file_names<S: AsRef<str>>(
    lines: &[S],
    start: usize,
    list_path: &Path,
) -> IoResult<Vec<InputFileInfo>> {
    let base = list_path.parent().unwrap_or_else(|| Path::new(""));
    let mut files: Vec<InputFileInfo> = Vec::new();

    for (i, raw) in lines.iter().enumerate().skip(start) {
        let line = raw.as_ref();
        if is_blank_or_comment(line) {
            continue;
        }

        if let Some(rest) = strip_keyword(line, "[FILE]") {
            let name = rest.trim();
            if name.is_empty() {
                return Err(IoError::header(list_path, i + 1, "[FILE] 缺少文件名"));
            }
            let path = Path::new(name);
            let path = if path.is_relative() { base.join(path) } else { path.to_path_buf() };
            files.push(InputFileInfo {
                path,
                start_time: None,
                end_time: None,
            });
        } else if let Some(rest) = strip_keyword(line, "[STARTTIME]") {
            let t = parse_stamp(rest, list_path, i, line)?;
            current(&mut files, list_path, i)?.start_time = Some(t);
        } else if let Some(rest) = strip_keyword(line, "[ENDTIME]") {
            let t = parse_stamp(rest, list_path, i, line)?;
            current(&mut files, list_path, i)?.end_time = Some(t);
        } else {
            return Err(IoError::header(
                list_path,
                i + 1,
                format!("文件列表中出现无法识别的行: '{}'", line.trim()),
            ));
        }
    }

    if files.is_empty() {
        return Err(IoError::header(list_path, start + 1, "文件列表为空"));
    }

    Ok(files)
}

fn parse_stamp(fields: &str, file: &Path, line: usize, text: &str) -> IoResult<f64> {
    parse_day_month_year(fields).ok_or_else(|| IoError::TimeStamp {
        file: file.to_path_buf(),
        line: line + 1,
        text: text.trim().to_string(),
    })
}

fn current<'a>(files: &'a mut [InputFileInfo], file: &Path, line: usize) -> IoResult<&'a mut InputFileInfo> {
    files
        .last_mut()
        .ok_or_else(|| IoError::header(file, line + 1, "时间声明出现在 [FILE] 之前"))
}

/// 单个文件的状态快照
#[derive(Debug, Clone, PartialEq)]
struct FileStamp {
    path: PathBuf,
    len: Option<u64>,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn capture(path: &Path) -> Self {
        let meta = fs::metadata(path).ok();
        Self {
            path: path.to_path_buf(),
            len: meta.as_ref().map(|m| m.len()),
            modified: meta.and_then(|m| m.modified().ok()),
        }
    }
}

/// 文件集指纹
///
/// 记录列表文件和每个子文件的长度与修改时间。列表文件增长、
/// 子文件被改写或新增时指纹随之变化，据此决定是否重新扫描。
#[derive(Debug, Clone, PartialEq)]
pub struct FileSetFingerprint {
    list: FileStamp,
    files: Vec<FileStamp>,
}

impl FileSetFingerprint {
    /// 采集当前指纹
    pub fn capture(list_path: &Path, files: &[InputFileInfo]) -> Self {
        Self {
            list: FileStamp::capture(list_path),
            files: files.iter().map(|f| FileStamp::capture(&f.path)).collect(),
        }
    }

    /// 引用的子文件数量
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 与磁盘上的当前状态相比是否已变化
    pub fn has_changed(&self) -> bool {
        if FileStamp::capture(&self.list.path) != self.list {
            return true;
        }
        self.files.iter().any(|f| FileStamp::capture(&f.path) != *f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_names() {
        let lines = [
            "[FILE] sub/a.cur",
            "[STARTTIME] 14 2 2000 10 00",
            "[ENDTIME] 14 2 2000 16 00",
            "",
            "[file] /abs/b.cur",
        ];
        let files = read_input_file_names(&lines, 0, Path::new("/data/list.cur")).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("/data/sub/a.cur"));
        assert_eq!(files[0].end_time.unwrap() - files[0].start_time.unwrap(), 6.0 * 3600.0);
        assert_eq!(files[1].path, PathBuf::from("/abs/b.cur"));
        assert!(files[1].start_time.is_none());
    }

    #[test]
    fn test_time_before_file_rejected() {
        let lines = ["[STARTTIME] 14 2 2000 10 00", "[FILE] a.cur"];
        assert!(read_input_file_names(&lines, 0, Path::new("l.cur")).is_err());
    }

    #[test]
    fn test_bad_stamp() {
        let lines = ["[FILE] a.cur", "[STARTTIME] 14 2"];
        let err = read_input_file_names(&lines, 0, Path::new("l.cur")).unwrap_err();
        assert!(matches!(err, IoError::TimeStamp { line: 2, .. }));
    }

    #[test]
    fn test_empty_list() {
        assert!(read_input_file_names::<&str>(&[], 0, Path::new("l.cur")).is_err());
    }

    #[test]
    fn test_fingerprint_detects_growth() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("list.cur");
        let part = dir.path().join("a.cur");
        fs::write(&list, "[FILE] a.cur\n").unwrap();
        fs::write(&part, "x").unwrap();

        let files = vec![InputFileInfo { path: part, start_time: None, end_time: None }];
        let fp = FileSetFingerprint::capture(&list, &files);
        assert_eq!(fp.file_count(), 1);
        assert!(!fp.has_changed());

        fs::write(&list, "[FILE] a.cur\n[FILE] b.cur\n").unwrap();
        assert!(fp.has_changed());
    }
}
