//! 规范检查（就地标记）
//!
//! 读取活动工作表第7行至最后一行，按检查规则给不符合的单元格加黄色底色并保存原文件。
//! 没有发现问题时不写文件，因此对已合格的文件重复检查不会产生任何改动。

use crate::error::{PlanError, Result};
use crate::ooxml::{Package, SheetPart, StyleSheet, Worksheet, STYLES_PART};
use crate::reader::{cell_text, open_workbook};
use calamine::{Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use workplan_common::audit::{check_row, AuditRow, Violation};
use workplan_common::layout::DATA_START_ROW;
use workplan_common::style::VIOLATION_FILL;

/// 检查结果
#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub path: PathBuf,
    pub sheet: String,
    pub violations: Vec<Violation>,
    /// 是否写回了文件
    pub saved: bool,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_clean() {
            "检查完成！未发现不规范内容".to_string()
        } else {
            format!(
                "检查完成！共发现 {} 处不规范内容，已用黄色标记",
                self.violations.len()
            )
        }
    }
}

/// 检查并就地标记
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn audit_file(path: &Path) -> Result<AuditReport> {
    let report = inspect(path)?;
    if report.is_clean() {
        info!(sheet = %report.sheet, "未发现不规范内容");
        return Ok(report);
    }

    mark_violations(path, &report.violations).map_err(|e| PlanError::Save(e.to_string()))?;
    info!(sheet = %report.sheet, violations = report.violations.len(), "已标记并保存");
    Ok(AuditReport {
        saved: true,
        ..report
    })
}

/// 只检查，不修改文件
pub fn inspect(path: &Path) -> Result<AuditReport> {
    let package = Package::open(path)?;
    let sheet_part = package.active_sheet()?;
    let sheet = Worksheet::parse(&package.read_str(&sheet_part.path)?, &sheet_part.path)?;
    let last_row = sheet.max_row();

    let range = read_range(path, &sheet_part)?;
    let violations = (DATA_START_ROW..=last_row)
        .flat_map(|row| {
            let audit_row = AuditRow::from_cells(row, |column| value_at(&range, row, column.index()));
            check_row(&audit_row)
        })
        .collect();

    Ok(AuditReport {
        path: path.to_path_buf(),
        sheet: sheet_part.name,
        violations,
        saved: false,
    })
}

fn read_range(path: &Path, sheet_part: &SheetPart) -> Result<Range<Data>> {
    let mut workbook = open_workbook(path)?;
    workbook
        .worksheet_range(&sheet_part.name)
        .map_err(|e| PlanError::Workbook {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// (1起算行号, 0起算列号) 的单元格文本
fn value_at(range: &Range<Data>, row: u32, col: u16) -> Option<String> {
    range.get_value((row - 1, col as u32)).and_then(audit_text)
}

/// 检查用的单元格文本
///
/// 只有空白与错误单元格为 `None`；全是空格的文本保留原样，由检查规则去除首尾空白。
fn audit_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => cell_text(other),
    }
}

fn mark_violations(path: &Path, violations: &[Violation]) -> Result<()> {
    let mut package = Package::open(path)?;
    let sheet_part = package.active_sheet()?;
    let mut sheet = Worksheet::parse(&package.read_str(&sheet_part.path)?, &sheet_part.path)?;
    let mut styles = StyleSheet::parse(&package.read_str(STYLES_PART)?)?;

    for violation in violations {
        for column in &violation.cells {
            let col = column.index();
            let current = sheet.cell_style(violation.row, col);
            let marked = styles.with_fill(current, VIOLATION_FILL)?;
            sheet.set_cell_style(violation.row, col, marked)?;
        }
    }

    package.replace(&sheet_part.path, sheet.to_bytes()?);
    package.replace(STYLES_PART, styles.to_bytes()?);
    package.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_text_keeps_whitespace() {
        assert_eq!(audit_text(&Data::String(" ".into())), Some(" ".to_string()));
        assert_eq!(audit_text(&Data::Empty), None);
        assert_eq!(audit_text(&Data::Float(3.0)), Some("3".to_string()));
    }
}
