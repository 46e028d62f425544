//! 测试用工作簿的生成与读取

#![allow(dead_code)]

use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use workplan_common::REQUIRED_COLUMNS;
use workplan_merge::ooxml::xml::Document;
use workplan_merge::ooxml::{Package, Worksheet};
use workplan_merge::reader::{range_to_grid, Grid};

pub const TITLE: &str = "附录2：营销现场作业计划审批表";

/// 一行作业计划（15列，空字符串表示空单元格）
pub fn plan_row(seq: &str, job: &str, start: &str, end: &str) -> Vec<String> {
    vec![
        seq, job, "营销部", "城东所", "施工一队", "城东所辖区", start, end, "张三", "营销", "可接受",
        "否", "3", "否", "",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// 工作表：名称、表头位置（0起算，`None` 为无表头的杂项表）、数据行
pub struct FixtureSheet<'a> {
    pub name: &'a str,
    pub header_offset: Option<u32>,
    pub rows: &'a [Vec<String>],
}

pub fn write_plan(path: &Path, header_offset: u32, rows: &[Vec<String>]) {
    write_plan_sheets(
        path,
        &[FixtureSheet {
            name: "Sheet1",
            header_offset: Some(header_offset),
            rows,
        }],
    );
}

pub fn write_plan_sheets(path: &Path, sheets: &[FixtureSheet<'_>]) {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(sheet.name).unwrap();
        ws.write_string(0, 0, TITLE).unwrap();

        let Some(offset) = sheet.header_offset else {
            ws.write_string(2, 0, "说明").unwrap();
            ws.write_string(2, 1, "本表不是计划表").unwrap();
            continue;
        };

        ws.write_string(1, 0, "城东供电所").unwrap();
        for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
            ws.write_string(offset, col as u16, *name).unwrap();
        }
        for (i, row) in sheet.rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    ws.write_string(offset + 1 + i as u32, col as u16, value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// 模板：标题行、第5行表头，A/B/F列设置列宽
pub fn write_template(path: &Path) {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name("审批表").unwrap();
    ws.write_string(0, 0, TITLE).unwrap();
    for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
        ws.write_string(4, col as u16, *name).unwrap();
    }
    ws.set_column_width(0, 6).unwrap();
    ws.set_column_width(1, 30).unwrap();
    ws.set_column_width(5, 24).unwrap();
    workbook.save(path).unwrap();
}

/// 审批表（第7行起只填 B/D/E/F/K/N）
pub fn write_audit_sheet(path: &Path, rows: &[[&str; 6]]) {
    const COLUMNS: [u16; 6] = [1, 3, 4, 5, 10, 13];
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.write_string(0, 0, TITLE).unwrap();
    for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
        ws.write_string(4, col as u16, *name).unwrap();
    }
    for (i, values) in rows.iter().enumerate() {
        let row = 6 + i as u32;
        ws.write_number(row, 0, (i + 1) as f64).unwrap();
        for (col, value) in COLUMNS.iter().zip(values.iter()) {
            if !value.is_empty() {
                ws.write_string(row, *col, *value).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

/// 读取第一个工作表的网格
pub fn read_grid(path: &Path) -> Grid {
    let mut workbook = open_workbook_auto(path).unwrap();
    let first = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&first).unwrap();
    range_to_grid(&range)
}

/// 单元格文本（1起算行号、0起算列号）
pub fn cell(grid: &Grid, row: u32, col: usize) -> Option<String> {
    grid.get(row as usize - 1)
        .and_then(|r| r.get(col))
        .cloned()
        .flatten()
}

pub fn active_sheet(path: &Path) -> Worksheet {
    let package = Package::open(path).unwrap();
    let part = package.active_sheet().unwrap();
    Worksheet::parse(&package.read_str(&part.path).unwrap(), &part.path).unwrap()
}

/// 单元格底色（ARGB），无填充时为 `None`
pub fn fill_rgb(path: &Path, row: u32, col: u16) -> Option<String> {
    let package = Package::open(path).unwrap();
    let styles = Document::parse(&package.read_str("xl/styles.xml").unwrap(), "xl/styles.xml").unwrap();
    let xf_index = active_sheet(path).cell_style(row, col);

    let xf = styles
        .root
        .child("cellXfs")?
        .elements()
        .filter(|e| e.name == "xf")
        .nth(xf_index as usize)?;
    let fill_id: usize = xf.attr("fillId")?.parse().ok()?;
    let fill = styles.root.child("fills")?.elements().nth(fill_id)?;
    fill.child("patternFill")?
        .child("fgColor")?
        .attr("rgb")
        .map(String::from)
}

/// 单元格所用字体名
pub fn font_name(path: &Path, row: u32, col: u16) -> Option<String> {
    let package = Package::open(path).unwrap();
    let styles = Document::parse(&package.read_str("xl/styles.xml").unwrap(), "xl/styles.xml").unwrap();
    let xf_index = active_sheet(path).cell_style(row, col);

    let xf = styles
        .root
        .child("cellXfs")?
        .elements()
        .filter(|e| e.name == "xf")
        .nth(xf_index as usize)?;
    let font_id: usize = xf.attr("fontId")?.parse().ok()?;
    let font = styles.root.child("fonts")?.elements().nth(font_id)?;
    font.child("name")?.attr("val").map(String::from)
}
