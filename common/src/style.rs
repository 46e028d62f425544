//! 单元格样式描述
//!
//! 渲染与检查只描述"要什么样式"，写入 styles.xml 的工作由主程序的包编辑层完成。

use serde::{Deserialize, Serialize};

/// 重复行底色（浅红）
pub const DUPLICATE_FILL: u32 = 0xFFB6C1;

/// 违规单元格底色（黄）
pub const VIOLATION_FILL: u32 = 0xFFFF00;

/// 默认字体
pub const DEFAULT_FONT_NAME: &str = "宋体";

/// 默认字号
pub const DEFAULT_FONT_SIZE: f64 = 9.0;

/// 数据单元格的统一样式
///
/// 水平、垂直居中，自动换行，四边细边框。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub font_name: String,
    pub font_size: f64,
    pub wrap: bool,
    pub centered: bool,
    pub thin_border: bool,
    /// 纯色填充（RGB）
    pub fill: Option<u32>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            wrap: true,
            centered: true,
            thin_border: true,
            fill: None,
        }
    }
}

impl CellStyle {
    pub fn with_font(mut self, name: &str, size: f64) -> Self {
        self.font_name = name.to_string();
        self.font_size = size;
        self
    }

    pub fn with_fill(mut self, rgb: u32) -> Self {
        self.fill = Some(rgb);
        self
    }

    /// 重复行使用的样式
    pub fn duplicate(&self) -> Self {
        self.clone().with_fill(DUPLICATE_FILL)
    }
}

/// RGB → OOXML的ARGB文本（`FFB6C1` → `FFFFB6C1`）
pub fn argb(rgb: u32) -> String {
    format!("FF{:06X}", rgb & 0x00FF_FFFF)
}
