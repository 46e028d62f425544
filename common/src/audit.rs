//! 规范检查规则
//!
//! 对已生成的审批表逐行检查：
//! - 内容不匹配：施工单位为计量用户运维一班/二班时，供电所（D列）必须同时出现在
//!   作业内容（B列）与施工地点（F列）中
//! - 可接受风险 / 低风险：基准风险等级（K列）与是否纳入视频监督（N列）必须对应
//!
//! 单元格值取去除首尾空白后的文本，空单元格按字面值 `None` 比较。

use serde::Serialize;

/// 需要做内容一致性检查的施工单位
pub const AUDITED_TEAMS: [&str; 2] = ["计量用户运维一班", "计量用户运维二班"];

/// 空单元格的比较值
pub const MISSING_CELL: &str = "None";

/// 参与检查的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AuditColumn {
    B,
    D,
    E,
    F,
    K,
    N,
}

impl AuditColumn {
    /// 列序号（0起算）
    pub fn index(&self) -> u16 {
        match self {
            AuditColumn::B => 1,
            AuditColumn::D => 3,
            AuditColumn::E => 4,
            AuditColumn::F => 5,
            AuditColumn::K => 10,
            AuditColumn::N => 13,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            AuditColumn::B => "B",
            AuditColumn::D => "D",
            AuditColumn::E => "E",
            AuditColumn::F => "F",
            AuditColumn::K => "K",
            AuditColumn::N => "N",
        }
    }
}

/// 规则种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleKind {
    /// 内容不匹配
    ContentMismatch,
    /// 可接受风险
    AcceptableRisk,
    /// 低风险
    LowRisk,
}

impl RuleKind {
    /// 规则标识（结果表中显示的名称）
    pub fn id(&self) -> &'static str {
        match self {
            RuleKind::ContentMismatch => "内容不匹配",
            RuleKind::AcceptableRisk => "可接受风险",
            RuleKind::LowRisk => "低风险",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// 一行中参与检查的单元格值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    /// 行号（1起算）
    pub row: u32,
    pub b: String,
    pub d: String,
    pub e: String,
    pub f: String,
    pub k: String,
    pub n: String,
}

impl AuditRow {
    /// 由取值函数构造（`None` 视为空单元格）
    pub fn from_cells<F>(row: u32, mut cell: F) -> Self
    where
        F: FnMut(AuditColumn) -> Option<String>,
    {
        let mut value = |column| normalize(cell(column));
        Self {
            row,
            b: value(AuditColumn::B),
            d: value(AuditColumn::D),
            e: value(AuditColumn::E),
            f: value(AuditColumn::F),
            k: value(AuditColumn::K),
            n: value(AuditColumn::N),
        }
    }
}

fn normalize(value: Option<String>) -> String {
    match value {
        Some(text) => text.trim().to_string(),
        None => MISSING_CELL.to_string(),
    }
}

/// 违规记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// 行号（1起算）
    pub row: u32,
    /// 结果表的三列值
    pub values: [String; 3],
    pub rule: RuleKind,
    /// 说明
    pub message: String,
    /// 需要标色的列
    pub cells: Vec<AuditColumn>,
}

/// 检查一行
///
/// 内容规则每行至多一条；风险规则两条互斥，至多一条。
pub fn check_row(row: &AuditRow) -> Vec<Violation> {
    let mut violations = Vec::new();

    if AUDITED_TEAMS.contains(&row.e.as_str()) {
        let mut cells = Vec::new();
        if !row.b.contains(row.d.as_str()) {
            cells.push(AuditColumn::B);
        }
        if !row.f.contains(row.d.as_str()) {
            cells.push(AuditColumn::F);
        }
        if !cells.is_empty() {
            let sides: Vec<&str> = cells.iter().map(|c| c.letter()).collect();
            violations.push(Violation {
                row: row.row,
                values: [row.b.clone(), row.d.clone(), row.f.clone()],
                rule: RuleKind::ContentMismatch,
                message: format!("{}列未包含供电所「{}」", sides.join("、"), row.d),
                cells,
            });
        }
    }

    let risk = match row.k.as_str() {
        "可接受" if row.n != "否" => Some((RuleKind::AcceptableRisk, "否")),
        "低风险" if row.n != "是" => Some((RuleKind::LowRisk, "是")),
        _ => None,
    };
    if let Some((rule, expected)) = risk {
        violations.push(Violation {
            row: row.row,
            values: [row.k.clone(), row.n.clone(), format!("N列应为\"{}\"", expected)],
            rule,
            message: format!("基准风险等级为「{}」时N列应为「{}」，实际为「{}」", row.k, expected, row.n),
            cells: vec![AuditColumn::N],
        });
    }

    violations
}
