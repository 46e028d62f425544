use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("无法读取工作簿 {path}: {reason}")]
    Workbook { path: String, reason: String },

    #[error("xlsx包错误: {0}")]
    Package(String),

    #[error("XML解析错误（{part}）: {reason}")]
    Xml { part: String, reason: String },

    #[error("没有数据可保存")]
    NoData,

    #[error("保存失败：{0}")]
    Save(String),

    #[error("检查报告生成失败: {0}")]
    Report(#[from] workplan_common::Error),

    #[error("日志初始化失败: {0}")]
    Logging(String),

    #[error("JSON解析错误: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for PlanError {
    fn from(e: zip::result::ZipError) -> Self {
        PlanError::Package(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
