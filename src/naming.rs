//! 默认输出文件名
//!
//! `{前缀}_{YYYYMMDD}.xlsx`，第一个输入文件第2、3行有标题时为
//! `{前缀}（{标题}）_{YYYYMMDD}.xlsx`。

use crate::reader::{find_title, open_workbook, sheet_grid};
use calamine::Reader;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 文件名中不能使用的字符
const INVALID_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// 替换非法字符并去掉首尾空白
pub fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// 组合输出文件名
pub fn output_file_name(prefix: &str, title: Option<&str>, date: NaiveDate) -> String {
    let stamp = date.format("%Y%m%d");
    let title = title
        .map(|t| t.trim().trim_start_matches('（').trim_end_matches('）').trim())
        .filter(|t| !t.is_empty() && !prefix.contains(t));
    let name = match title {
        Some(t) => format!("{}（{}）_{}.xlsx", prefix, t, stamp),
        None => format!("{}_{}.xlsx", prefix, stamp),
    };
    sanitize_file_name(&name)
}

/// 第一个输入文件首个工作表的标题（读取失败时为 `None`）
pub fn read_title(path: &Path) -> Option<String> {
    let mut workbook = open_workbook(path).ok()?;
    let first = workbook.sheet_names().into_iter().next()?;
    let grid = sheet_grid(&mut workbook, &first).ok()?;
    let title = find_title(&grid);
    debug!(file = %path.display(), title = ?title, "读取标题");
    title
}

/// 默认输出路径
pub fn default_output_path(dir: &Path, prefix: &str, first_input: Option<&Path>, date: NaiveDate) -> PathBuf {
    let title = first_input.and_then(read_title);
    dir.join(output_file_name(prefix, title.as_deref(), date))
}
