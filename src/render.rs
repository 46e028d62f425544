//! 模板输出
//!
//! 在模板活动工作表的第7行起写入合并结果：
//! 序号重新从1编号，时间列写为日期文本，其他列原样写入。
//! 每个单元格统一样式，按估算的换行行数设置行高，重复行整行浅红底色。

use crate::error::{PlanError, Result};
use crate::ooxml::{CellValue, Package, StyleSheet, Worksheet, STYLES_PART};
use std::path::Path;
use tracing::{debug, info, instrument};
use workplan_common::layout::{RowHeightPolicy, DATA_START_ROW};
use workplan_common::schema::COLUMN_COUNT;
use workplan_common::{CellStyle, DateFormat, FieldValue, MergedDataset};

/// 不参与行高估算的列（序号、开始时间、结束时间）
const HEIGHT_EXCLUDED_COLUMNS: [usize; 3] = [0, 6, 7];

/// 输出选项
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOptions {
    pub date_format: DateFormat,
    pub row_height: RowHeightPolicy,
    pub style: CellStyle,
}

/// 以默认选项输出
pub fn render_output(template: &Path, dataset: Option<&MergedDataset>, output: &Path) -> Result<()> {
    render_output_with(template, dataset, output, &RenderOptions::default())
}

/// 输出到 `output`
///
/// 没有数据时返回 [`PlanError::NoData`]；读取模板、写入、保存中的任何错误
/// 都归为一个 [`PlanError::Save`]。
#[instrument(level = "info", skip_all, fields(template = %template.display(), output = %output.display()))]
pub fn render_output_with(
    template: &Path,
    dataset: Option<&MergedDataset>,
    output: &Path,
    options: &RenderOptions,
) -> Result<()> {
    let dataset = dataset.ok_or(PlanError::NoData)?;
    write_dataset(template, dataset, output, options).map_err(|e| match e {
        PlanError::Save(_) => e,
        other => PlanError::Save(other.to_string()),
    })?;
    info!(rows = dataset.len(), duplicates = dataset.duplicates.len(), "保存成功");
    Ok(())
}

fn write_dataset(
    template: &Path,
    dataset: &MergedDataset,
    output: &Path,
    options: &RenderOptions,
) -> Result<()> {
    let mut package = Package::open(template)?;
    let sheet_part = package.active_sheet()?;
    debug!(sheet = %sheet_part.name, part = %sheet_part.path, "模板工作表");

    let mut sheet = Worksheet::parse(&package.read_str(&sheet_part.path)?, &sheet_part.path)?;
    let mut styles = StyleSheet::parse(&package.read_str(STYLES_PART)?)?;

    let widths = sheet.column_widths();
    let plain_xf = styles.add_cell_style(&options.style)?;
    let duplicate_xf = styles.add_cell_style(&options.style.duplicate())?;

    for (index, order) in dataset.rows.iter().enumerate() {
        let row = DATA_START_ROW + index as u32;
        let xf = if dataset.is_duplicate(index) {
            duplicate_xf
        } else {
            plain_xf
        };

        let mut texts: Vec<(String, Option<f64>)> = Vec::new();
        for col in 0..COLUMN_COUNT {
            let col_id = col as u16;
            match order.field(col) {
                _ if col == 0 => {
                    sheet.set_cell(row, col_id, CellValue::Number((index + 1) as f64), xf)?
                }
                FieldValue::Time(t) => {
                    let text = options.date_format.format(t);
                    sheet.set_cell(row, col_id, CellValue::Text(&text), xf)?
                }
                FieldValue::Text(text) => {
                    sheet.set_cell(row, col_id, CellValue::Text(text), xf)?;
                    if !HEIGHT_EXCLUDED_COLUMNS.contains(&col) {
                        texts.push((text.to_string(), widths.get(&col_id).copied()));
                    }
                }
                FieldValue::Empty => sheet.set_cell(row, col_id, CellValue::Blank, xf)?,
            }
        }

        let height = options
            .row_height
            .row_height(texts.iter().map(|(text, width)| (text.as_str(), *width)));
        sheet.set_row_height(row, height)?;
    }

    sheet.restore_column_widths(&widths);
    sheet.update_dimension();

    package.replace(&sheet_part.path, sheet.to_bytes()?);
    package.replace(STYLES_PART, styles.to_bytes()?);
    package.save(output)
}
