//! 工作表定位
//!
//! 依次尝试每个工作表的第4行、第5行作为表头，返回第一个通过表头校验的表格。
//! 全部失败时返回逐次尝试的原因。每个工作表只读取一次。

use crate::reader::{open_workbook, sheet_grid, Grid, Workbook};
use calamine::Reader;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument};
use workplan_common::schema::{validate_frame, HEADER_OFFSETS};
use workplan_common::types::{is_blank, is_orphan_sequence};
use workplan_common::{Frame, WorkOrder};

/// 定位成功的表格
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSheet {
    pub sheet: String,
    /// 表头行（0起算）
    pub header_offset: usize,
    /// 已去除空行、只有序号的行，并解析了时间
    pub rows: Vec<WorkOrder>,
}

impl ResolvedSheet {
    /// 表头所在的行号（1起算）
    pub fn header_row(&self) -> usize {
        self.header_offset + 1
    }
}

/// 一次尝试
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetAttempt {
    /// `None` 表示整个文件无法读取
    pub sheet: Option<String>,
    /// `None` 表示工作表本身无法读取
    pub header_offset: Option<usize>,
    pub reason: String,
}

impl fmt::Display for SheetAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.sheet, self.header_offset) {
            (Some(sheet), Some(offset)) => {
                write!(f, "工作表「{}」第{}行表头：{}", sheet, offset + 1, self.reason)
            }
            (Some(sheet), None) => write!(f, "工作表「{}」：{}", sheet, self.reason),
            (None, _) => write!(f, "文件：{}", self.reason),
        }
    }
}

/// 定位失败时的报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub attempts: Vec<SheetAttempt>,
}

impl ResolveReport {
    fn push(&mut self, sheet: Option<&str>, header_offset: Option<usize>, reason: impl ToString) {
        self.attempts.push(SheetAttempt {
            sheet: sheet.map(str::to_string),
            header_offset,
            reason: reason.to_string(),
        });
    }
}

impl fmt::Display for ResolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "没有找到有效的表格结构")?;
        for attempt in &self.attempts {
            write!(f, "\n    - {}", attempt)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveReport {}

/// 打开文件并定位表格（打开失败也记入报告）
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn resolve_sheet(path: &Path) -> Result<ResolvedSheet, ResolveReport> {
    match open_workbook(path) {
        Ok(mut workbook) => resolve_workbook(&mut workbook),
        Err(e) => {
            let mut report = ResolveReport::default();
            report.push(None, None, e);
            Err(report)
        }
    }
}

/// 在已打开的工作簿中定位表格
pub fn resolve_workbook(workbook: &mut Workbook) -> Result<ResolvedSheet, ResolveReport> {
    let mut report = ResolveReport::default();

    for sheet in workbook.sheet_names() {
        let grid = match sheet_grid(workbook, &sheet) {
            Ok(grid) => grid,
            Err(e) => {
                debug!(sheet = %sheet, error = %e, "工作表无法读取");
                report.push(Some(&sheet), None, e);
                continue;
            }
        };

        match resolve_grid(&grid) {
            Ok((header_offset, rows)) => {
                info!(sheet = %sheet, header_row = header_offset + 1, rows = rows.len(), "使用表格");
                return Ok(ResolvedSheet {
                    sheet,
                    header_offset,
                    rows,
                });
            }
            Err(failures) => {
                for (offset, reason) in failures {
                    debug!(sheet = %sheet, header_row = offset + 1, reason = %reason, "表头不符");
                    report.push(Some(&sheet), Some(offset), reason);
                }
            }
        }
    }

    if report.attempts.is_empty() {
        report.push(None, None, "工作簿中没有工作表");
    }
    Err(report)
}

/// 在一个网格上依次尝试候选表头行
///
/// 成功时返回 (表头行, 记录)，失败时返回每个候选行的原因。
pub fn resolve_grid(grid: &Grid) -> Result<(usize, Vec<WorkOrder>), Vec<(usize, String)>> {
    let mut failures = Vec::new();
    for offset in HEADER_OFFSETS {
        let frame = Frame::from_grid(grid, offset);
        match validate_frame(&frame) {
            Ok(()) => {
                let rows = frame
                    .records()
                    .into_iter()
                    .filter(|record| !is_orphan_sequence(record) && !is_blank(record))
                    .map(WorkOrder::from_record)
                    .collect();
                return Ok((offset, rows));
            }
            Err(e) => failures.push((offset, e.to_string())),
        }
    }
    Err(failures)
}
