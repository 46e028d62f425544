//! 营销现场作业计划 合并与规范检查
//!
//! - reader / resolver: 读取工作簿并定位有效表格
//! - merge: 多文件合并、排序、查重
//! - render: 写入模板
//! - auditor: 规范检查与就地标记
//! - pipeline: 带进度通知的合并任务

pub mod auditor;
pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod naming;
pub mod ooxml;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod resolver;

pub use auditor::{audit_file, AuditReport};
pub use error::{PlanError, Result};
pub use merge::{merge_files, merge_files_with, FileError, FileFailure, MergeOutcome};
pub use pipeline::{JobOutcome, MergeJob, NoProgress, ProgressSink};
pub use render::{render_output, render_output_with, RenderOptions};
pub use resolver::{resolve_sheet, ResolveReport, ResolvedSheet};
pub use workplan_common::validate_frame;
