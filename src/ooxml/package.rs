//! xlsx包（zip）的读写
//!
//! 整个包读入内存，修改个别部件后写到临时文件，再重命名覆盖目标路径。

use crate::error::{PlanError, Result};
use crate::ooxml::xml::Document;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const STYLES_PART: &str = "xl/styles.xml";

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    modified: Option<DateTime>,
    is_dir: bool,
}

/// 工作表在包中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPart {
    pub name: String,
    /// 例：`xl/worksheets/sheet1.xml`
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            PlanError::Package(format!("无法打开 {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                modified: file.last_modified(),
                is_dir: file.is_dir(),
            });
        }
        Ok(Self { entries })
    }

    pub fn read(&self, name: &str) -> Result<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
            .ok_or_else(|| PlanError::Package(format!("缺少部件 {}", name)))
    }

    pub fn read_str(&self, name: &str) -> Result<String> {
        let bytes = self.read(name)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| PlanError::Package(format!("{} 不是UTF-8文本: {}", name, e)))
    }

    pub fn read_xml(&self, name: &str) -> Result<Document> {
        Document::parse(&self.read_str(name)?, name)
    }

    /// 替换部件内容（不存在时追加）
    pub fn replace(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                modified: None,
                is_dir: false,
            }),
        }
    }

    /// 工作表一览（按 workbook.xml 中的顺序）
    pub fn sheets(&self) -> Result<Vec<SheetPart>> {
        let workbook = self.read_xml(WORKBOOK_PART)?;
        let rels = self.read_xml(WORKBOOK_RELS_PART)?;

        let targets: Vec<(&str, &str)> = rels
            .root
            .elements()
            .filter(|e| e.name == "Relationship")
            .filter_map(|e| Some((e.attr("Id")?, e.attr("Target")?)))
            .collect();

        let sheets = workbook
            .root
            .child("sheets")
            .ok_or_else(|| PlanError::Package("workbook.xml 中没有 sheets".into()))?;

        let mut parts = Vec::new();
        for sheet in sheets.elements().filter(|e| e.name == "sheet") {
            let Some(name) = sheet.attr("name") else {
                continue;
            };
            let rid = sheet
                .attrs
                .iter()
                .find(|(k, _)| k.ends_with(":id"))
                .map(|(_, v)| v.as_str());
            let target = rid.and_then(|rid| {
                targets
                    .iter()
                    .find(|(id, _)| *id == rid)
                    .map(|(_, target)| *target)
            });
            if let Some(target) = target {
                parts.push(SheetPart {
                    name: name.to_string(),
                    path: join_and_normalize("xl/", target),
                });
            }
        }

        if parts.is_empty() {
            return Err(PlanError::Package("工作簿中没有工作表".into()));
        }
        Ok(parts)
    }

    /// 活动工作表（`workbookView@activeTab`，默认第一个）
    pub fn active_sheet(&self) -> Result<SheetPart> {
        let workbook = self.read_xml(WORKBOOK_PART)?;
        let active = workbook
            .root
            .child("bookViews")
            .and_then(|views| views.child("workbookView"))
            .and_then(|view| view.attr("activeTab"))
            .and_then(|tab| tab.parse::<usize>().ok())
            .unwrap_or(0);

        let mut sheets = self.sheets()?;
        let index = if active < sheets.len() { active } else { 0 };
        Ok(sheets.swap_remove(index))
    }

    fn write_entries<W: Write + Seek>(&self, out: &mut ZipWriter<W>) -> Result<()> {
        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let mut opts = SimpleFileOptions::default().compression_method(method);
            if let Some(dt) = entry.modified {
                opts = opts.last_modified_time(dt);
            }

            if entry.is_dir {
                out.add_directory(entry.name.as_str(), opts)?;
                continue;
            }
            out.start_file(entry.name.as_str(), opts)?;
            out.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// 保存到 `path`（先写 `{path}.tmp` 再重命名）
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = tmp_path_for(path);
        let result = self.save_to_tmp(&tmp_path).and_then(|_| {
            if let Err(first) = std::fs::rename(&tmp_path, path) {
                // rename不能覆盖时先删除再重试
                let _ = std::fs::remove_file(path);
                std::fs::rename(&tmp_path, path).map_err(|second| {
                    PlanError::Package(format!("无法替换文件: {}; {}", first, second))
                })?;
            }
            Ok(())
        });
        match &result {
            Ok(()) => debug!(path = %path.display(), "xlsx包已保存"),
            Err(_) => {
                let _ = std::fs::remove_file(&tmp_path);
            }
        }
        result
    }

    fn save_to_tmp(&self, tmp_path: &Path) -> Result<()> {
        let file = File::create(tmp_path)?;
        let mut out = ZipWriter::new(file);
        self.write_entries(&mut out)?;
        out.finish()?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// 关系目标 → 包内路径
///
/// `worksheets/sheet1.xml` → `xl/worksheets/sheet1.xml`，
/// `/xl/worksheets/sheet1.xml` → `xl/worksheets/sheet1.xml`
pub fn join_and_normalize(base: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}{}", base, target),
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}
