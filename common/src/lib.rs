//! 营销现场作业计划 公共库
//!
//! 不涉及文件读写的领域逻辑：数据类型、表头校验、时间解析、查重、版式与检查规则

pub mod types;
pub mod schema;
pub mod timefmt;
pub mod duplicate;
pub mod layout;
pub mod style;
pub mod audit;
pub mod error;
pub mod export;

pub use types::{Cell, FieldValue, Frame, MergedDataset, RawRecord, WorkOrder};
pub use schema::{validate_frame, validate_headers, SchemaError, COLUMN_COUNT, REQUIRED_COLUMNS};
pub use timefmt::{parse_datetime, DateFormat};
pub use duplicate::{mark_duplicates, DuplicatePolicy};
pub use layout::{RowHeightPolicy, RowHeightPreset, DATA_START_ROW};
pub use style::CellStyle;
pub use audit::{check_row, AuditColumn, AuditRow, RuleKind, Violation};
pub use error::{Error, Result};
