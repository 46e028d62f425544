//! xlsx模板的就地编辑
//!
//! - package: zip包的读写
//! - xml: 轻量XML树
//! - styles: styles.xml 追加样式
//! - sheet: 工作表单元格、行高、列宽

pub mod package;
pub mod sheet;
pub mod styles;
pub mod xml;

pub use package::{Package, SheetPart, STYLES_PART};
pub use sheet::{cell_ref, column_letter, CellValue, Worksheet};
pub use styles::StyleSheet;
