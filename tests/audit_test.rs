//! 规范检查测试
//!
//! 检查后读回文件，确认只有违规单元格被标为黄色

mod fixtures;

use fixtures::{cell, fill_rgb, read_grid, write_audit_sheet, write_template};
use tempfile::tempdir;
use workplan_common::audit::{AuditColumn, RuleKind};
use workplan_common::DuplicatePolicy;
use workplan_merge::auditor::inspect;
use workplan_merge::{audit_file, render_output, PlanError};

const YELLOW: &str = "FFFFFF00";

/// 列顺序：B, D, E, F, K, N
const CLEAN: [&str; 6] = ["城东所表计更换", "城东所", "计量用户运维一班", "城东所辖区", "可接受", "否"];

/// B列不含供电所：只标B列
#[test]
fn test_only_b_flagged() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(
        &path,
        &[["表计更换", "城东所", "计量用户运维一班", "城东所辖区", "可接受", "否"]],
    );

    let report = audit_file(&path);
    assert!(report.is_ok(), "检查失败: {:?}", report.err());
    let report = report.unwrap();

    assert_eq!(report.violations.len(), 1);
    let v = &report.violations[0];
    assert_eq!(v.row, 7);
    assert_eq!(v.rule, RuleKind::ContentMismatch);
    assert_eq!(v.values, ["表计更换".to_string(), "城东所".to_string(), "城东所辖区".to_string()]);
    assert!(report.saved);

    assert_eq!(fill_rgb(&path, 7, 1).as_deref(), Some(YELLOW));
    assert_eq!(fill_rgb(&path, 7, 5), None);
    assert_eq!(fill_rgb(&path, 7, 13), None);
}

/// 其他施工单位不做内容检查
#[test]
fn test_other_team_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(
        &path,
        &[["表计更换", "城东所", "施工一队", "某小区", "可接受", "否"]],
    );

    let report = audit_file(&path).unwrap();
    assert!(report.is_clean());
}

/// 可接受风险但N列为"是"：标N列
#[test]
fn test_acceptable_risk_marks_n() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(
        &path,
        &[
            CLEAN,
            ["城东所表计更换", "城东所", "计量用户运维二班", "城东所辖区", "可接受", "是"],
        ],
    );

    let report = audit_file(&path).unwrap();
    assert_eq!(report.violations.len(), 1);
    let v = &report.violations[0];
    assert_eq!(v.row, 8);
    assert_eq!(v.rule, RuleKind::AcceptableRisk);
    assert_eq!(v.values[2], "N列应为\"否\"");
    assert_eq!(v.cells, vec![AuditColumn::N]);

    assert_eq!(fill_rgb(&path, 8, 13).as_deref(), Some(YELLOW));
    assert_eq!(fill_rgb(&path, 8, 10), None);
    assert_eq!(fill_rgb(&path, 7, 13), None);
}

/// 低风险且N列为空：按字面值 None 比较，仍为违规
#[test]
fn test_low_risk_with_empty_n() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(
        &path,
        &[["城东所表计更换", "城东所", "施工一队", "城东所辖区", "低风险", ""]],
    );

    let report = audit_file(&path).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].rule, RuleKind::LowRisk);
    assert_eq!(report.violations[0].values[1], "None");
    assert_eq!(fill_rgb(&path, 7, 13).as_deref(), Some(YELLOW));
}

/// D列只有空格：去除空白后为空字符串，而不是空单元格的 None
#[test]
fn test_whitespace_station_is_empty_text() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(&path, &[["表计更换", " ", "计量用户运维一班", "某小区", "", ""]]);

    let report = audit_file(&path).unwrap();
    assert!(report.is_clean(), "意外的违规: {:?}", report.violations);
    assert!(!report.saved);
    assert_eq!(fill_rgb(&path, 7, 1), None);
    assert_eq!(fill_rgb(&path, 7, 5), None);
}

/// 合格的文件：不写回，文件内容不变
#[test]
fn test_clean_file_untouched() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(&path, &[CLEAN, CLEAN]);
    let before = std::fs::read(&path).unwrap();

    let first = audit_file(&path).unwrap();
    let second = audit_file(&path).unwrap();

    assert!(first.is_clean());
    assert!(!first.saved);
    assert!(!second.saved);
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(first.summary(), "检查完成！未发现不规范内容");
}

/// 标记后值不变：再次检查得到相同结果
#[test]
fn test_marking_keeps_values() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    write_audit_sheet(
        &path,
        &[["表计更换", "城东所", "计量用户运维一班", "某小区", "低风险", "否"]],
    );

    let first = audit_file(&path).unwrap();
    assert_eq!(first.violations.len(), 2);

    let again = inspect(&path).unwrap();
    assert_eq!(again.violations, first.violations);

    let grid = read_grid(&path);
    assert_eq!(cell(&grid, 7, 1).as_deref(), Some("表计更换"));
    assert_eq!(cell(&grid, 7, 13).as_deref(), Some("否"));
    assert_eq!(fill_rgb(&path, 7, 1).as_deref(), Some(YELLOW));
    assert_eq!(fill_rgb(&path, 7, 5).as_deref(), Some(YELLOW));
    assert_eq!(fill_rgb(&path, 7, 13).as_deref(), Some(YELLOW));
}

/// 合并输出的审批表可以直接检查
#[test]
fn test_audit_rendered_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = dir.path().join("template.xlsx");
    let output = dir.path().join("out.xlsx");
    write_template(&template);

    let mut record: [Option<String>; 15] = Default::default();
    record[0] = Some("1".to_string());
    record[1] = Some("表计更换".to_string());
    record[3] = Some("城东所".to_string());
    record[4] = Some("计量用户运维一班".to_string());
    record[5] = Some("城东所辖区".to_string());
    record[6] = Some("2024-05-01 08:00".to_string());
    record[7] = Some("2024-05-01 17:00".to_string());
    record[10] = Some("可接受".to_string());
    record[13] = Some("否".to_string());
    let dataset = workplan_common::MergedDataset::build(
        vec![workplan_common::WorkOrder::from_record(record)],
        DuplicatePolicy::FullRow,
    );
    render_output(&template, Some(&dataset), &output).unwrap();

    let report = audit_file(&output).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].cells, vec![AuditColumn::B]);
    assert_eq!(fill_rgb(&output, 7, 1).as_deref(), Some(YELLOW));
    assert_eq!(fill_rgb(&output, 7, 3), None);
}

/// 无法打开的文件
#[test]
fn test_audit_not_a_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("plan.xlsx");
    std::fs::write(&path, "hello").unwrap();

    let err = audit_file(&path).unwrap_err();
    assert!(matches!(err, PlanError::Package(_)), "意外的错误: {:?}", err);
}
