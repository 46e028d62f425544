//! 多文件合并
//!
//! 每个文件独立判定，出错的文件只记录原因，不中断其他文件。
//! 判定结果：全部成功 / 部分成功 / 全部失败。

use crate::reader::open_workbook;
use crate::resolver::{resolve_workbook, ResolveReport};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};
use workplan_common::schema::{END_TIME_COLUMN, START_TIME_COLUMN};
use workplan_common::{DuplicatePolicy, MergedDataset, WorkOrder};

/// 单个文件不可用的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    #[error("文件不存在")]
    Missing,

    #[error("无法作为表格打开：{0}")]
    NotSpreadsheet(String),

    #[error("{0}")]
    NoValidSheet(ResolveReport),

    #[error("表格「{sheet}」中没有数据")]
    Empty { sheet: String },

    #[error("表格「{sheet}」的「{column}」列全部为空或无法解析")]
    TimeColumnUnparseable { sheet: String, column: &'static str },
}

/// 出错的文件
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: FileError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        write!(f, "文件 {}：{}", name, self.error)
    }
}

/// 合并结果
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// 所有文件均有效
    Complete(MergedDataset),
    /// 部分文件出错，其余文件的数据可用
    Partial {
        dataset: MergedDataset,
        failures: Vec<FileFailure>,
    },
    /// 没有任何有效文件
    Failed(Vec<FileFailure>),
}

impl MergeOutcome {
    /// 按有效表格与失败记录判定结果
    pub fn decide(
        frames: Vec<Vec<WorkOrder>>,
        failures: Vec<FileFailure>,
        policy: DuplicatePolicy,
    ) -> Self {
        if frames.is_empty() {
            return MergeOutcome::Failed(failures);
        }

        let rows: Vec<WorkOrder> = frames.into_iter().flatten().collect();
        let dataset = MergedDataset::build(rows, policy);

        if failures.is_empty() {
            MergeOutcome::Complete(dataset)
        } else {
            MergeOutcome::Partial { dataset, failures }
        }
    }

    pub fn dataset(&self) -> Option<&MergedDataset> {
        match self {
            MergeOutcome::Complete(dataset) | MergeOutcome::Partial { dataset, .. } => Some(dataset),
            MergeOutcome::Failed(_) => None,
        }
    }

    pub fn failures(&self) -> &[FileFailure] {
        match self {
            MergeOutcome::Complete(_) => &[],
            MergeOutcome::Partial { failures, .. } | MergeOutcome::Failed(failures) => failures,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, MergeOutcome::Partial { .. })
    }

    /// 面向用户的说明（可能多行）
    pub fn message(&self) -> String {
        match self {
            MergeOutcome::Complete(dataset) => format!(
                "合并成功：共 {} 行，重复 {} 行",
                dataset.len(),
                dataset.duplicates.len()
            ),
            MergeOutcome::Partial { dataset, failures } => format!(
                "部分文件处理失败（已合并 {} 行）：\n{}",
                dataset.len(),
                join_failures(failures)
            ),
            MergeOutcome::Failed(failures) => {
                format!("没有有效数据可合并：\n{}", join_failures(failures))
            }
        }
    }

    /// (数据, 说明)
    pub fn into_parts(self) -> (Option<MergedDataset>, String) {
        let message = self.message();
        match self {
            MergeOutcome::Complete(dataset) | MergeOutcome::Partial { dataset, .. } => {
                (Some(dataset), message)
            }
            MergeOutcome::Failed(_) => (None, message),
        }
    }
}

fn join_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 合并（默认查重策略）
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> MergeOutcome {
    merge_files_with(paths, DuplicatePolicy::default())
}

/// 合并
#[instrument(level = "info", skip_all, fields(files = paths.len(), policy = %policy))]
pub fn merge_files_with<P: AsRef<Path>>(paths: &[P], policy: DuplicatePolicy) -> MergeOutcome {
    let mut frames = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        let path = path.as_ref();
        match load_file(path) {
            Ok(rows) => frames.push(rows),
            Err(error) => {
                warn!(file = %path.display(), error = %error, "跳过文件");
                failures.push(FileFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    let outcome = MergeOutcome::decide(frames, failures, policy);
    info!(
        rows = outcome.dataset().map_or(0, |d| d.len()),
        failures = outcome.failures().len(),
        "合并完成"
    );
    outcome
}

/// 读取单个文件的有效记录
pub fn load_file(path: &Path) -> Result<Vec<WorkOrder>, FileError> {
    if !path.exists() {
        return Err(FileError::Missing);
    }

    let mut workbook = open_workbook(path).map_err(|e| FileError::NotSpreadsheet(e.to_string()))?;
    let resolved = resolve_workbook(&mut workbook).map_err(FileError::NoValidSheet)?;

    if resolved.rows.is_empty() {
        return Err(FileError::Empty {
            sheet: resolved.sheet,
        });
    }
    if resolved.rows.iter().all(|r| r.start_time.is_none()) {
        return Err(FileError::TimeColumnUnparseable {
            sheet: resolved.sheet,
            column: START_TIME_COLUMN,
        });
    }
    if resolved.rows.iter().all(|r| r.end_time.is_none()) {
        return Err(FileError::TimeColumnUnparseable {
            sheet: resolved.sheet,
            column: END_TIME_COLUMN,
        });
    }

    Ok(resolved.rows)
}
