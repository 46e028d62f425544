//! 规范检查结果的Excel报告
//!
//! 列：行号 / B列内容 / D列内容 / F列内容 / 规则 / 说明

use crate::audit::Violation;
use crate::error::Result;
use crate::style::{DEFAULT_FONT_NAME, VIOLATION_FILL};
use rust_xlsxwriter::*;
use std::path::Path;

/// 报告表头
pub const REPORT_HEADERS: [&str; 6] = ["行号", "B列内容", "D列内容", "F列内容", "规则", "说明"];

const REPORT_COLUMN_WIDTHS: [f64; 6] = [8.0, 36.0, 18.0, 36.0, 12.0, 48.0];

/// 报告工作表名
pub const REPORT_SHEET_NAME: &str = "检查结果";

/// 生成报告并返回xlsx字节
///
/// 违规为空时只输出表头行。
pub fn generate_violation_report(source: &str, violations: &[Violation]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let title_format = Format::new()
        .set_bold()
        .set_font_name(DEFAULT_FONT_NAME)
        .set_font_size(12.0);

    let header_format = Format::new()
        .set_bold()
        .set_font_name(DEFAULT_FONT_NAME)
        .set_font_size(10.0)
        .set_background_color(Color::RGB(VIOLATION_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    let value_format = Format::new()
        .set_font_name(DEFAULT_FONT_NAME)
        .set_font_size(10.0)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET_NAME)?;

    for (col, width) in REPORT_COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    worksheet.write_string_with_format(
        0,
        0,
        format!("{}：共发现 {} 处不规范内容", source, violations.len()),
        &title_format,
    )?;

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(2, col as u16, *header, &header_format)?;
    }

    for (i, violation) in violations.iter().enumerate() {
        let row = 3 + i as u32;
        worksheet.write_number_with_format(row, 0, violation.row as f64, &value_format)?;
        for (offset, value) in violation.values.iter().enumerate() {
            worksheet.write_string_with_format(row, 1 + offset as u16, value, &value_format)?;
        }
        worksheet.write_string_with_format(row, 4, violation.rule.id(), &value_format)?;
        worksheet.write_string_with_format(row, 5, &violation.message, &value_format)?;
    }

    worksheet.set_freeze_panes(3, 0)?;

    Ok(workbook.save_to_buffer()?)
}

/// 生成报告并写入 `path`
pub fn save_violation_report(path: &Path, source: &str, violations: &[Violation]) -> Result<()> {
    let bytes = generate_violation_report(source, violations)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{check_row, AuditRow};

    #[test]
    fn test_report_is_xlsx() {
        let row = AuditRow {
            row: 8,
            b: "表计更换".into(),
            d: "城东所".into(),
            e: "计量用户运维一班".into(),
            f: "城东所".into(),
            k: "可接受".into(),
            n: "是".into(),
        };
        let violations = check_row(&row);
        let bytes = generate_violation_report("审批表.xlsx", &violations).unwrap();
        // zip署名
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_empty_report() {
        let bytes = generate_violation_report("审批表.xlsx", &[]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_save_into_missing_dir() {
        let path = Path::new("/nonexistent/dir/report.xlsx");
        let err = save_violation_report(path, "审批表.xlsx", &[]).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
