//! 表头结构（15列）定义与校验
//!
//! 输入文件的表头必须包含全部15个必需列，且B列（第2列）固定为「作业类型（内容）」。

use crate::types::Frame;
use thiserror::Error;

/// 必需列（按模板顺序）
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "序号",
    "作业类型（内容）",
    "项目管理单位/部门",
    "供电所",
    "施工单位",
    "施工地点",
    "工作开始时间",
    "工作结束时间",
    "工作负责人及电话（电话可选填）",
    "专业",
    "基准风险等级",
    "是否需要停电",
    "施工人数",
    "是否纳入视频监督",
    "备注",
];

/// 列数
pub const COLUMN_COUNT: usize = REQUIRED_COLUMNS.len();

/// 第2列必须是作业类型列
pub const JOB_TYPE_COLUMN: &str = "作业类型（内容）";

/// 工作开始时间列
pub const START_TIME_COLUMN: &str = "工作开始时间";

/// 工作结束时间列
pub const END_TIME_COLUMN: &str = "工作结束时间";

/// 候选表头行（0起算，即第4行、第5行）
pub const HEADER_OFFSETS: [usize; 2] = [3, 4];

/// 表头校验失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("列数不足（{0}列）")]
    TooFewColumns(usize),

    #[error("B列应为「{expected}」，实际为「{found}」{}", missing_suffix(.missing))]
    SecondColumnMismatch {
        expected: String,
        found: String,
        missing: Vec<String>,
    },

    #[error("缺少必需列：{}", .0.join("、"))]
    MissingColumns(Vec<String>),
}

fn missing_suffix(missing: &[String]) -> String {
    if missing.is_empty() {
        String::new()
    } else {
        format!("；缺少必需列：{}", missing.join("、"))
    }
}

/// 校验表头
///
/// 判定顺序：列数 → B列名称 → 必需列是否齐全。
/// B列不符时一并列出缺失列，便于定位。
pub fn validate_headers(headers: &[String]) -> Result<(), SchemaError> {
    if headers.len() <= 1 {
        return Err(SchemaError::TooFewColumns(headers.len()));
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.trim() == **required))
        .map(|required| required.to_string())
        .collect();

    let second = headers[1].trim();
    if second != JOB_TYPE_COLUMN {
        return Err(SchemaError::SecondColumnMismatch {
            expected: JOB_TYPE_COLUMN.to_string(),
            found: second.to_string(),
            missing,
        });
    }

    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    Ok(())
}

/// 校验数据框的表头
pub fn validate_frame(frame: &Frame) -> Result<(), SchemaError> {
    validate_headers(&frame.headers)
}

/// 必需列在表头中的位置（首次出现）
///
/// 调用前应已通过 [`validate_headers`]；缺失的列返回 `None`。
pub fn column_positions(headers: &[String]) -> [Option<usize>; COLUMN_COUNT] {
    let mut positions = [None; COLUMN_COUNT];
    for (slot, required) in positions.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
        *slot = headers.iter().position(|h| h.trim() == *required);
    }
    positions
}
