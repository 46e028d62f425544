//! 合并任务
//!
//! 合并 → 输出，按阶段通知进度（10% / 50% / 100%），最后返回唯一的结果。

use crate::merge::merge_files_with;
use crate::render::{render_output_with, RenderOptions};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument};
use workplan_common::DuplicatePolicy;

/// 进度通知
pub trait ProgressSink {
    fn progress(&mut self, percent: u8, stage: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(u8, &str),
{
    fn progress(&mut self, percent: u8, stage: &str) {
        self(percent, stage)
    }
}

/// 不需要进度时使用
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&mut self, _percent: u8, _stage: &str) {}
}

/// 任务的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success(String),
    /// 输出已完成，但有文件被跳过
    PartialSuccess(String),
    Failure(String),
}

impl JobOutcome {
    pub fn message(&self) -> &str {
        match self {
            JobOutcome::Success(m) | JobOutcome::PartialSuccess(m) | JobOutcome::Failure(m) => m,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failure(_))
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// 一次合并任务
#[derive(Debug, Clone)]
pub struct MergeJob {
    pub inputs: Vec<PathBuf>,
    pub template: PathBuf,
    pub output: PathBuf,
    pub duplicate_policy: DuplicatePolicy,
    pub render: RenderOptions,
}

impl MergeJob {
    pub fn new(inputs: Vec<PathBuf>, template: PathBuf, output: PathBuf) -> Self {
        Self {
            inputs,
            template,
            output,
            duplicate_policy: DuplicatePolicy::default(),
            render: RenderOptions::default(),
        }
    }

    #[instrument(level = "info", skip_all, fields(inputs = self.inputs.len()))]
    pub fn run(&self, sink: &mut dyn ProgressSink) -> JobOutcome {
        sink.progress(10, "合并文件");
        let outcome = merge_files_with(&self.inputs, self.duplicate_policy);
        sink.progress(50, "写入模板");

        let partial = outcome.is_partial();
        let (dataset, message) = outcome.into_parts();
        let Some(dataset) = dataset else {
            return JobOutcome::Failure(message);
        };

        if let Err(e) = render_output_with(&self.template, Some(&dataset), &self.output, &self.render) {
            return JobOutcome::Failure(e.to_string());
        }
        sink.progress(100, "完成");

        let saved = format!("输出文件：{}", self.output.display());
        info!(output = %self.output.display(), partial, "任务完成");
        if partial {
            JobOutcome::PartialSuccess(format!("处理完成，但{}\n{}", message, saved))
        } else {
            JobOutcome::Success(format!("处理完成！{}\n{}", message, saved))
        }
    }
}
