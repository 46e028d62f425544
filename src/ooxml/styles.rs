//! styles.xml 的追加式编辑
//!
//! 只在 fonts / fills / borders / cellXfs 末尾追加条目，已有样式的下标保持不变。

use crate::error::{PlanError, Result};
use crate::ooxml::xml::{Document, Element, Node};
use crate::ooxml::package::STYLES_PART;
use std::collections::HashMap;
use workplan_common::style::{argb, CellStyle};

/// 中文字符集（GB2312）
const CHARSET_GB2312: &str = "134";

#[derive(Debug, Clone)]
pub struct StyleSheet {
    doc: Document,
    /// (原样式, 底色) → 派生样式
    fill_cache: HashMap<(u32, u32), u32>,
}

impl StyleSheet {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            fill_cache: HashMap::new(),
        }
    }

    pub fn parse(xml: &str) -> Result<Self> {
        Ok(Self::new(Document::parse(xml, STYLES_PART)?))
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// 按描述追加样式，返回 cellXfs 下标
    pub fn add_cell_style(&mut self, style: &CellStyle) -> Result<u32> {
        let font_id = self.append("fonts", font_element(style))?;
        let fill_id = match style.fill {
            Some(rgb) => self.append("fills", solid_fill(rgb))?,
            None => 0,
        };
        let border_id = if style.thin_border {
            self.append("borders", thin_border())?
        } else {
            0
        };

        let mut xf = Element::new("xf")
            .with_attr("numFmtId", "0")
            .with_attr("fontId", font_id.to_string())
            .with_attr("fillId", fill_id.to_string())
            .with_attr("borderId", border_id.to_string())
            .with_attr("xfId", "0")
            .with_attr("applyFont", "1");
        if style.fill.is_some() {
            xf.set_attr("applyFill", "1");
        }
        if style.thin_border {
            xf.set_attr("applyBorder", "1");
        }
        if style.centered || style.wrap {
            xf.set_attr("applyAlignment", "1");
            let mut alignment = Element::new("alignment");
            if style.centered {
                alignment.set_attr("horizontal", "center");
                alignment.set_attr("vertical", "center");
            }
            if style.wrap {
                alignment.set_attr("wrapText", "1");
            }
            xf = xf.with_child(alignment);
        }

        self.append("cellXfs", xf)
    }

    /// 复制 `xf` 并只替换底色（保留字体、边框、对齐）
    pub fn with_fill(&mut self, xf: u32, rgb: u32) -> Result<u32> {
        if let Some(derived) = self.fill_cache.get(&(xf, rgb)) {
            return Ok(*derived);
        }

        let fill_id = self.append("fills", solid_fill(rgb))?;
        let mut derived = self
            .list("cellXfs")?
            .elements()
            .filter(|e| e.name == "xf")
            .nth(xf as usize)
            .cloned()
            .unwrap_or_else(|| {
                Element::new("xf")
                    .with_attr("numFmtId", "0")
                    .with_attr("fontId", "0")
                    .with_attr("borderId", "0")
                    .with_attr("xfId", "0")
            });
        derived.set_attr("fillId", fill_id.to_string());
        derived.set_attr("applyFill", "1");

        let index = self.append("cellXfs", derived)?;
        self.fill_cache.insert((xf, rgb), index);
        Ok(index)
    }

    /// cellXfs 条目数
    pub fn cell_xf_count(&self) -> Result<usize> {
        Ok(self.list("cellXfs")?.elements().filter(|e| e.name == "xf").count())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.doc.to_bytes(STYLES_PART)
    }

    fn list(&self, name: &str) -> Result<&Element> {
        self.doc
            .root
            .child(name)
            .ok_or_else(|| PlanError::Package(format!("styles.xml 中没有 {}", name)))
    }

    /// 追加到列表末尾并更新 count，返回新条目下标
    fn append(&mut self, list: &str, entry: Element) -> Result<u32> {
        let parent = self
            .doc
            .root
            .child_mut(list)
            .ok_or_else(|| PlanError::Package(format!("styles.xml 中没有 {}", list)))?;
        parent.children.push(Node::Element(entry));
        let count = parent.elements().count();
        parent.set_attr("count", count.to_string());
        Ok((count - 1) as u32)
    }
}

fn font_element(style: &CellStyle) -> Element {
    Element::new("font")
        .with_child(Element::new("sz").with_attr("val", format_points(style.font_size)))
        .with_child(Element::new("name").with_attr("val", style.font_name.as_str()))
        .with_child(Element::new("charset").with_attr("val", CHARSET_GB2312))
}

fn solid_fill(rgb: u32) -> Element {
    let color = argb(rgb);
    Element::new("fill").with_child(
        Element::new("patternFill")
            .with_attr("patternType", "solid")
            .with_child(Element::new("fgColor").with_attr("rgb", color.as_str()))
            .with_child(Element::new("bgColor").with_attr("rgb", color.as_str())),
    )
}

fn thin_border() -> Element {
    let mut border = Element::new("border");
    for side in ["left", "right", "top", "bottom"] {
        border = border.with_child(
            Element::new(side)
                .with_attr("style", "thin")
                .with_child(Element::new("color").with_attr("auto", "1")),
        );
    }
    border.with_child(Element::new("diagonal"))
}

/// 字号/行高/列宽的文本形式（整数不带小数点）
pub fn format_points(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

    #[test]
    fn test_add_cell_style_appends() {
        let mut sheet = StyleSheet::parse(STYLES).unwrap();
        let plain = sheet.add_cell_style(&CellStyle::default()).unwrap();
        let dup = sheet.add_cell_style(&CellStyle::default().duplicate()).unwrap();
        assert_eq!(plain, 2);
        assert_eq!(dup, 3);
        assert_eq!(sheet.cell_xf_count().unwrap(), 4);

        let root = &sheet.document().root;
        assert_eq!(root.child("fonts").unwrap().attr("count"), Some("3"));
        assert_eq!(root.child("fills").unwrap().attr("count"), Some("3"));
        assert_eq!(root.child("borders").unwrap().attr("count"), Some("3"));

        let xf = root.child("cellXfs").unwrap().elements().nth(3).unwrap();
        assert_eq!(xf.attr("fillId"), Some("2"));
        assert_eq!(xf.child("alignment").unwrap().attr("wrapText"), Some("1"));
    }

    #[test]
    fn test_with_fill_keeps_font_and_numfmt() {
        let mut sheet = StyleSheet::parse(STYLES).unwrap();
        let derived = sheet.with_fill(1, 0xFFFF00).unwrap();
        assert_eq!(derived, 2);
        let xf = sheet
            .document()
            .root
            .child("cellXfs")
            .unwrap()
            .elements()
            .nth(2)
            .unwrap();
        assert_eq!(xf.attr("numFmtId"), Some("14"));
        assert_eq!(xf.attr("fillId"), Some("2"));

        // 同一组合复用
        assert_eq!(sheet.with_fill(1, 0xFFFF00).unwrap(), 2);
        assert_eq!(sheet.cell_xf_count().unwrap(), 3);
    }

    #[test]
    fn test_missing_list_is_error() {
        let mut sheet = StyleSheet::parse("<styleSheet/>").unwrap();
        assert!(sheet.add_cell_style(&CellStyle::default()).is_err());
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(9.0), "9");
        assert_eq!(format_points(10.5), "10.5");
    }
}
