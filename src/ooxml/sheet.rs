//! 工作表XML的编辑
//!
//! 行（`<row r>`）与单元格（`<c r>`）始终按位置升序保存；
//! 解析时为缺少 `r` 属性的行和单元格补上位置。

use crate::error::{PlanError, Result};
use crate::ooxml::styles::format_points;
use crate::ooxml::xml::{Document, Element, Node};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// 写入单元格的值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    /// 内联字符串
    Text(&'a str),
    Number(f64),
    /// 只有样式的空单元格
    Blank,
}

#[derive(Debug, Clone)]
pub struct Worksheet {
    part: String,
    doc: Document,
}

impl Worksheet {
    pub fn parse(xml: &str, part: &str) -> Result<Self> {
        let mut doc = Document::parse(xml, part)?;
        if doc.root.child("sheetData").is_none() {
            return Err(PlanError::Xml {
                part: part.to_string(),
                reason: "缺少 sheetData".into(),
            });
        }
        assign_positions(&mut doc.root);
        Ok(Self {
            part: part.to_string(),
            doc,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.doc.to_bytes(&self.part)
    }

    /// 显式设置的列宽（0起算列号 → 宽度）
    pub fn column_widths(&self) -> BTreeMap<u16, f64> {
        let mut widths = BTreeMap::new();
        let Some(cols) = self.doc.root.child("cols") else {
            return widths;
        };
        for col in cols.elements().filter(|e| e.name == "col") {
            let (Some(min), Some(max), Some(width)) = (
                col.attr("min").and_then(|v| v.parse::<u16>().ok()),
                col.attr("max").and_then(|v| v.parse::<u16>().ok()),
                col.attr("width").and_then(|v| v.parse::<f64>().ok()),
            ) else {
                continue;
            };
            for c in min.max(1)..=max.min(16384) {
                widths.insert(c - 1, width);
            }
        }
        widths
    }

    /// 按事先取得的列宽改写 `<col>` 的宽度
    pub fn restore_column_widths(&mut self, widths: &BTreeMap<u16, f64>) {
        let Some(cols) = self.doc.root.child_mut("cols") else {
            return;
        };
        for col in cols.elements_mut().filter(|e| e.name == "col") {
            let Some(min) = col.attr("min").and_then(|v| v.parse::<u16>().ok()) else {
                continue;
            };
            if let Some(width) = widths.get(&min.saturating_sub(1)) {
                col.set_attr("width", format_points(*width));
                col.set_attr("customWidth", "1");
            }
        }
    }

    /// 写入单元格（已有内容与公式被覆盖）
    pub fn set_cell(&mut self, row: u32, col: u16, value: CellValue<'_>, style: u32) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        let reference = cell_ref(row, col);
        *cell = Element::new("c").with_attr("r", reference).with_attr("s", style.to_string());
        match value {
            CellValue::Text(text) => {
                cell.set_attr("t", "inlineStr");
                let t = Element::new("t")
                    .with_attr("xml:space", "preserve")
                    .with_text(&encode_xstring(text));
                cell.children.push(Node::Element(Element::new("is").with_child(t)));
            }
            CellValue::Number(n) => {
                cell.children
                    .push(Node::Element(Element::new("v").with_text(&format_points(n))));
            }
            CellValue::Blank => {}
        }
        Ok(())
    }

    /// 单元格样式下标（无单元格或无 `s` 时为0）
    pub fn cell_style(&self, row: u32, col: u16) -> u32 {
        let reference = cell_ref(row, col);
        self.find_row(row)
            .and_then(|r| r.elements().find(|c| c.name == "c" && c.attr("r") == Some(reference.as_str())))
            .and_then(|c| c.attr("s"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// 只改样式（单元格不存在时创建空单元格）
    pub fn set_cell_style(&mut self, row: u32, col: u16, style: u32) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        cell.set_attr("s", style.to_string());
        Ok(())
    }

    /// 设置行高（pt）
    pub fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        let row = self.row_mut(row)?;
        row.set_attr("ht", format_points(height));
        row.set_attr("customHeight", "1");
        Ok(())
    }

    /// 最后一行的行号（无行时为0）
    pub fn max_row(&self) -> u32 {
        self.rows().filter_map(row_number).max().unwrap_or(0)
    }

    /// 按现有单元格更新 `<dimension ref>`
    pub fn update_dimension(&mut self) {
        let mut bounds: Option<(u32, u16, u32, u16)> = None;
        for cell in self.rows().flat_map(|r| r.elements()).filter(|c| c.name == "c") {
            let Some((row, col)) = cell.attr("r").and_then(parse_cell_ref) else {
                continue;
            };
            bounds = Some(match bounds {
                None => (row, col, row, col),
                Some((r0, c0, r1, c1)) => (r0.min(row), c0.min(col), r1.max(row), c1.max(col)),
            });
        }

        let reference = match bounds {
            Some((r0, c0, r1, c1)) if (r0, c0) == (r1, c1) => cell_ref(r0, c0),
            Some((r0, c0, r1, c1)) => format!("{}:{}", cell_ref(r0, c0), cell_ref(r1, c1)),
            None => "A1".to_string(),
        };
        if let Some(dimension) = self.doc.root.child_mut("dimension") {
            dimension.set_attr("ref", reference);
        }
    }

    /// 单元格文本（数值与内联字符串；共享字符串不解析）
    pub fn cell_text(&self, row: u32, col: u16) -> Option<String> {
        let reference = cell_ref(row, col);
        let cell = self
            .find_row(row)?
            .elements()
            .find(|c| c.name == "c" && c.attr("r") == Some(reference.as_str()))?;
        match cell.attr("t") {
            Some("inlineStr") => cell.child("is").map(|is| is.text()),
            _ => cell.child("v").map(|v| v.text()),
        }
    }

    /// 行高（未设置时为 `None`）
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.find_row(row)?.attr("ht")?.parse().ok()
    }

    fn rows(&self) -> impl Iterator<Item = &Element> {
        self.doc
            .root
            .child("sheetData")
            .into_iter()
            .flat_map(|data| data.elements())
            .filter(|e| e.name == "row")
    }

    fn find_row(&self, row: u32) -> Option<&Element> {
        self.rows().find(|r| row_number(r) == Some(row))
    }

    fn sheet_data_mut(&mut self) -> Result<&mut Element> {
        let part = self.part.clone();
        self.doc
            .root
            .child_mut("sheetData")
            .ok_or_else(|| PlanError::Xml {
                part,
                reason: "缺少 sheetData".into(),
            })
    }

    fn row_mut(&mut self, row: u32) -> Result<&mut Element> {
        let part = self.part.clone();
        let data = self.sheet_data_mut()?;

        let mut found = None;
        let mut insert_at = data.children.len();
        for (i, node) in data.children.iter().enumerate() {
            let Node::Element(e) = node else { continue };
            if e.name != "row" {
                continue;
            }
            match row_number(e) {
                Some(n) if n == row => {
                    found = Some(i);
                    break;
                }
                Some(n) if n > row => {
                    insert_at = i;
                    break;
                }
                _ => {}
            }
        }

        let index = match found {
            Some(i) => i,
            None => {
                let element = Element::new("row").with_attr("r", row.to_string());
                data.children.insert(insert_at, Node::Element(element));
                insert_at
            }
        };

        let element = data.element_at_mut(index).ok_or_else(|| PlanError::Xml {
            part,
            reason: format!("无法定位第{}行", row),
        })?;
        // spans 只是提示信息，行内容改变后移除
        element.remove_attr("spans");
        Ok(element)
    }

    fn cell_mut(&mut self, row: u32, col: u16) -> Result<&mut Element> {
        let part = self.part.clone();
        let reference = cell_ref(row, col);
        let row_element = self.row_mut(row)?;

        let mut found = None;
        let mut insert_at = row_element.children.len();
        for (i, node) in row_element.children.iter().enumerate() {
            let Node::Element(e) = node else { continue };
            if e.name != "c" {
                continue;
            }
            match e.attr("r").and_then(parse_cell_ref) {
                Some((_, c)) if c == col => {
                    found = Some(i);
                    break;
                }
                Some((_, c)) if c > col => {
                    insert_at = i;
                    break;
                }
                _ => {}
            }
        }

        let index = match found {
            Some(i) => i,
            None => {
                let element = Element::new("c").with_attr("r", reference.as_str());
                row_element.children.insert(insert_at, Node::Element(element));
                insert_at
            }
        };

        row_element.element_at_mut(index).ok_or_else(|| PlanError::Xml {
            part,
            reason: format!("无法定位单元格 {}", reference),
        })
    }
}

fn row_number(row: &Element) -> Option<u32> {
    row.attr("r").and_then(|r| r.parse().ok())
}

/// 补全缺省的行号与单元格位置
fn assign_positions(root: &mut Element) {
    let Some(data) = root.child_mut("sheetData") else {
        return;
    };
    let mut previous_row = 0u32;
    for row in data.elements_mut().filter(|e| e.name == "row") {
        let number = match row_number(row) {
            Some(n) => n,
            None => {
                let n = previous_row + 1;
                row.set_attr("r", n.to_string());
                n
            }
        };
        previous_row = number;

        let mut previous_col: Option<u16> = None;
        for cell in row.elements_mut().filter(|e| e.name == "c") {
            let col = match cell.attr("r").and_then(parse_cell_ref) {
                Some((_, c)) => c,
                None => {
                    let c = previous_col.map_or(0, |p| p + 1);
                    cell.set_attr("r", cell_ref(number, c));
                    c
                }
            };
            previous_col = Some(col);
        }
    }
}

/// XML 1.0 不允许出现的字符
fn is_xml_forbidden(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// 是否以 `_xHHHH_` 开头
fn starts_with_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes.starts_with(b"_x")
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// 单元格文本 → OOXML 字符串
///
/// 控制字符写为 `_xHHHH_`；原文中本来就像 `_xHHHH_` 的部分，其下划线写为 `_x005F_`。
pub fn encode_xstring(text: &str) -> Cow<'_, str> {
    let needs_encoding = text
        .char_indices()
        .any(|(i, c)| is_xml_forbidden(c) || (c == '_' && starts_with_escape(&text[i..])));
    if !needs_encoding {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        if is_xml_forbidden(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else if c == '_' && starts_with_escape(&text[i..]) {
            out.push_str("_x005F_");
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// 0起算列号 → 列字母（0 → A，26 → AA）
pub fn column_letter(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// (1起算行号, 0起算列号) → `A1` 形式
pub fn cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", column_letter(col), row)
}

/// `AB12` → (12, 27)
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u16)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col * 26 + (c as u32 - 'A' as u32 + 1);
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 || col == 0 || col > 16384 {
        return None;
    }
    Some((row, (col - 1) as u16))
}
