//! 输出表的版式：数据起始行、行高估算
//!
//! 行高按自动换行后的估算行数计算：
//! - 文本宽度：CJK统一汉字（U+4E00..U+9FFF）计2，其余字符计1
//! - 每行字符数：列宽 / 2（向下取整，至少1）
//! - 行数：文本宽度 / 每行字符数（向上取整）
//! - 行高：max(最小行高, 行数 × 行距 + 留白)，可选上限

use serde::{Deserialize, Serialize};

/// 数据起始行（1起算，模板第1〜6行为标题与表头）
pub const DATA_START_ROW: u32 = 7;

/// 未显式设置列宽时使用的列宽
pub const DEFAULT_COLUMN_WIDTH: f64 = 10.0;

/// 最小行高（pt）
pub const MIN_ROW_HEIGHT: f64 = 40.0;

/// 行高计算参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowHeightPolicy {
    /// 每行文本的高度
    pub line_height: f64,
    /// 上下留白
    pub padding: f64,
    /// 最小行高
    pub min_height: f64,
    /// 最大行高（`None` 为不限）
    pub max_height: Option<f64>,
}

impl RowHeightPolicy {
    /// 标准：8 × 行数 + 10，不设上限
    pub const STANDARD: Self = Self {
        line_height: 8.0,
        padding: 10.0,
        min_height: MIN_ROW_HEIGHT,
        max_height: None,
    };

    /// 紧凑：6 × 行数 + 5，上限 180
    pub const COMPACT: Self = Self {
        line_height: 6.0,
        padding: 5.0,
        min_height: MIN_ROW_HEIGHT,
        max_height: Some(180.0),
    };

    /// 由最大行数计算行高
    pub fn height_for_lines(&self, lines: usize) -> f64 {
        let height = (lines as f64 * self.line_height + self.padding).max(self.min_height);
        match self.max_height {
            Some(cap) => height.min(cap),
            None => height,
        }
    }

    /// 一行中各单元格 `(文本, 列宽)` → 行高
    pub fn row_height<'a, I>(&self, cells: I) -> f64
    where
        I: IntoIterator<Item = (&'a str, Option<f64>)>,
    {
        let lines = cells
            .into_iter()
            .map(|(text, width)| estimate_lines(text, width.unwrap_or(DEFAULT_COLUMN_WIDTH)))
            .max()
            .unwrap_or(1);
        self.height_for_lines(lines)
    }
}

impl Default for RowHeightPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// 预设的行高方案（配置文件中使用名称）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowHeightPreset {
    #[default]
    Standard,
    Compact,
}

impl RowHeightPreset {
    pub fn policy(&self) -> RowHeightPolicy {
        match self {
            RowHeightPreset::Standard => RowHeightPolicy::STANDARD,
            RowHeightPreset::Compact => RowHeightPolicy::COMPACT,
        }
    }
}

impl std::str::FromStr for RowHeightPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(RowHeightPreset::Standard),
            "compact" => Ok(RowHeightPreset::Compact),
            _ => Err(format!("未知的行高方案: {}（可选 standard / compact）", s)),
        }
    }
}

impl std::fmt::Display for RowHeightPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowHeightPreset::Standard => write!(f, "standard (8×行数+10)"),
            RowHeightPreset::Compact => write!(f, "compact (6×行数+5, 上限180)"),
        }
    }
}

/// 是否为CJK统一汉字
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// 文本宽度（汉字计2）
pub fn text_width(text: &str) -> usize {
    text.chars().map(|c| if is_cjk(c) { 2 } else { 1 }).sum()
}

/// 列宽对应的每行字符数
pub fn chars_per_line(column_width: f64) -> usize {
    let per_line = (column_width / 2.0).floor();
    if per_line < 1.0 {
        1
    } else {
        per_line as usize
    }
}

/// 估算换行后的行数（至少1行）
pub fn estimate_lines(text: &str, column_width: f64) -> usize {
    let width = text_width(text);
    if width == 0 {
        return 1;
    }
    width.div_ceil(chars_per_line(column_width)).max(1)
}
