//! 轻量XML树（quick-xml）
//!
//! 只保留元素、文本、CDATA与注释。命名空间不做解析，前缀原样作为名称的一部分。

use crate::error::{PlanError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader as XmlReader, Writer as XmlWriter};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.retain(|(k, _)| k != key);
    }

    /// 子元素
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// `children` 中下标 `index` 处的元素
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// 后代文本拼接
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(t) | Node::CData(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            Node::Comment(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            encoding: Some("UTF-8".into()),
            standalone: Some("yes".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub declaration: Option<Declaration>,
    pub root: Element,
}

fn xml_error(part: &str, reason: impl Display) -> PlanError {
    PlanError::Xml {
        part: part.to_string(),
        reason: reason.to_string(),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl Document {
    /// 解析XML文本，`part` 用于错误信息（如 `xl/styles.xml`）
    pub fn parse(xml: &str, part: &str) -> Result<Self> {
        let mut reader = XmlReader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf: Vec<u8> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut declaration = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Decl(d)) => {
                    declaration = Some(Declaration {
                        version: d.version().map(|v| lossy(&v)).unwrap_or_else(|_| "1.0".into()),
                        encoding: d.encoding().and_then(|r| r.ok()).map(|v| lossy(&v)),
                        standalone: d.standalone().and_then(|r| r.ok()).map(|v| lossy(&v)),
                    });
                }
                Ok(Event::Start(e)) => stack.push(element_from_start(&e, part)?),
                Ok(Event::Empty(e)) => {
                    let element = element_from_start(&e, part)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_error(part, "多余的结束标签"))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(t)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = t.unescape().map_err(|e| xml_error(part, e))?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::CData(lossy(&c.into_inner())));
                    }
                }
                Ok(Event::Comment(c)) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Comment(lossy(&c)));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(xml_error(part, e)),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(xml_error(part, "标签未闭合"));
        }
        let root = root.ok_or_else(|| xml_error(part, "没有根元素"))?;
        Ok(Self { declaration, root })
    }

    pub fn to_bytes(&self, part: &str) -> Result<Vec<u8>> {
        let mut writer = XmlWriter::new(Vec::new());
        if let Some(d) = &self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &d.version,
                    d.encoding.as_deref(),
                    d.standalone.as_deref(),
                )))
                .map_err(|e| xml_error(part, e))?;
        }
        write_element(&mut writer, &self.root, part)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(e: &BytesStart<'_>, part: &str) -> Result<Element> {
    let mut element = Element::new(&lossy(e.name().as_ref()));
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| xml_error(part, err))?;
        let value = attr.unescape_value().map_err(|err| xml_error(part, err))?;
        element
            .attrs
            .push((lossy(attr.key.as_ref()), value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn write_element(writer: &mut XmlWriter<Vec<u8>>, element: &Element, part: &str) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| xml_error(part, e));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| xml_error(part, e))?;
    for node in &element.children {
        let written = match node {
            Node::Element(child) => {
                write_element(writer, child, part)?;
                continue;
            }
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t))),
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str()))),
            Node::Comment(t) => writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str()))),
        };
        written.map_err(|e| xml_error(part, e))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| xml_error(part, e))
}
