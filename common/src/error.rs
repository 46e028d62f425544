//! 错误类型定义

use thiserror::Error;

/// 公共错误类型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    #[error("报告生成错误: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),
}

/// Result类型别名
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let error: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "报告被占用").into();
        assert!(matches!(error, Error::Io(_)));
        assert_eq!(error.to_string(), "IO错误: 报告被占用");
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_report_error_from_xlsx() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        // 工作表名不能超过31个字符
        let Err(xlsx_error) = sheet.set_name("检查结果".repeat(10)) else {
            panic!("超长的工作表名应报错");
        };
        let error: Error = xlsx_error.into();
        assert!(error.to_string().starts_with("报告生成错误"));
    }
}
