//! 工作簿读取（calamine）
//!
//! 所有单元格按文本读取，并按绝对行列位置展开为网格，
//! 保证「第4行」「第5行」与表格软件中看到的一致。

use crate::error::{PlanError, Result};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use workplan_common::Cell;

/// 已打开的工作簿（xlsx / xlsm / xls / ods）
pub type Workbook = Sheets<BufReader<File>>;

/// 行列网格（0起算，空白单元格为 `None`）
pub type Grid = Vec<Vec<Cell>>;

pub fn open_workbook(path: &Path) -> Result<Workbook> {
    open_workbook_auto(path).map_err(|e| PlanError::Workbook {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// 读取一个工作表的网格
pub fn sheet_grid(workbook: &mut Workbook, sheet: &str) -> Result<Grid> {
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| PlanError::Workbook {
            path: format!("工作表「{}」", sheet),
            reason: e.to_string(),
        })?;
    Ok(range_to_grid(&range))
}

/// Range → 绝对位置网格
pub fn range_to_grid(range: &Range<Data>) -> Grid {
    let (start_row, start_col) = match range.start() {
        Some(start) => (start.0 as usize, start.1 as usize),
        None => return Vec::new(),
    };

    let mut grid: Grid = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells: Vec<Cell> = vec![None; start_col];
        cells.extend(row.iter().map(cell_text));
        while matches!(cells.last(), Some(None)) {
            cells.pop();
        }
        grid.push(cells);
    }
    grid
}

/// 单元格 → 文本
///
/// - 整数值的浮点数按整数输出（`3.0` → `3`）
/// - 日期时间按 `YYYY-MM-DD HH:MM:SS` 输出，之后由时间解析统一处理
/// - 空白与错误单元格为 `None`
pub fn cell_text(cell: &Data) -> Cell {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        Data::DurationIso(s) => s.clone(),
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 标题（第2行或第3行中第一个非空单元格）
///
/// 审批表通常在表头上方写有供电所或计划周期，用于默认输出文件名。
pub fn find_title(grid: &Grid) -> Option<String> {
    grid.iter()
        .skip(1)
        .take(2)
        .flat_map(|row| row.iter().flatten())
        .map(|text| text.trim())
        .find(|text| !text.is_empty())
        .map(|text| text.to_string())
}
