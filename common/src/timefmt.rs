//! 工作时间的解析与输出格式
//!
//! 解析失败一律返回 `None`（不报错），与空单元格同等对待。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// 带时刻的格式
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y年%m月%d日 %H:%M:%S",
    "%Y年%m月%d日 %H:%M",
    "%Y年%m月%d日%H:%M",
    "%Y年%m月%d日%H时%M分",
    "%Y年%m月%d日 %H时%M分",
];

/// 仅日期的格式（时刻取 00:00:00）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// 解析时间文本
///
/// 支持常见的 `-`、`/`、`.`、中文年月日写法，以及8位数字日期。
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    // 纯数字只接受8位日期，避免把序号之类的数值误判为时间
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return parse_compact_date(trimmed);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// `YYYYMMDD`
fn parse_compact_date(digits: &str) -> Option<NaiveDateTime> {
    if digits.len() != 8 {
        return None;
    }
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(NaiveTime::MIN))
}

/// 输出日期格式
///
/// 不同版本的审批表分别使用过 `2024/05/01` 与 `2024-05-01` 两种写法，
/// 因此作为配置项提供，默认使用斜杠。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `YYYY/MM/DD`
    #[default]
    Slash,
    /// `YYYY-MM-DD`
    Dash,
}

impl DateFormat {
    /// strftime形式
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Slash => "%Y/%m/%d",
            DateFormat::Dash => "%Y-%m-%d",
        }
    }

    /// 格式化为日期字符串
    pub fn format(&self, value: &NaiveDateTime) -> String {
        value.format(self.pattern()).to_string()
    }
}

impl std::str::FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slash" | "/" => Ok(DateFormat::Slash),
            "dash" | "-" => Ok(DateFormat::Dash),
            _ => Err(format!("未知的日期格式: {}（可选 slash / dash）", s)),
        }
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateFormat::Slash => write!(f, "slash (YYYY/MM/DD)"),
            DateFormat::Dash => write!(f, "dash (YYYY-MM-DD)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_common_formats() {
        assert_eq!(parse_datetime("2024-05-01 08:30:00"), Some(dt(2024, 5, 1, 8, 30)));
        assert_eq!(parse_datetime("2024/05/01 08:30"), Some(dt(2024, 5, 1, 8, 30)));
        assert_eq!(parse_datetime("2024/5/1"), Some(dt(2024, 5, 1, 0, 0)));
        assert_eq!(parse_datetime("2024年5月1日"), Some(dt(2024, 5, 1, 0, 0)));
        assert_eq!(parse_datetime("2024年5月1日 9:00"), Some(dt(2024, 5, 1, 9, 0)));
        assert_eq!(parse_datetime("20240501"), Some(dt(2024, 5, 1, 0, 0)));
        assert_eq!(parse_datetime(" 2024.05.01 "), Some(dt(2024, 5, 1, 0, 0)));
    }

    #[test]
    fn test_parse_failures_are_none() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("   "), None);
        assert_eq!(parse_datetime("待定"), None);
        assert_eq!(parse_datetime("12"), None);
        assert_eq!(parse_datetime("2024-13-01"), None);
    }

    #[test]
    fn test_date_format_output() {
        let value = dt(2024, 5, 1, 8, 30);
        assert_eq!(DateFormat::Slash.format(&value), "2024/05/01");
        assert_eq!(DateFormat::Dash.format(&value), "2024-05-01");
        assert_eq!(DateFormat::default(), DateFormat::Slash);
    }

    #[test]
    fn test_date_format_from_str() {
        assert_eq!("dash".parse::<DateFormat>(), Ok(DateFormat::Dash));
        assert_eq!("SLASH".parse::<DateFormat>(), Ok(DateFormat::Slash));
        assert!("iso".parse::<DateFormat>().is_err());
    }
}
