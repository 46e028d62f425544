//! 报告输出

#[cfg(feature = "excel")]
pub mod excel_core;
