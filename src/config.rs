use crate::error::{PlanError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use workplan_common::layout::RowHeightPreset;
use workplan_common::style::{CellStyle, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE};
use workplan_common::{DateFormat, DuplicatePolicy};

/// 默认输出文件名前缀
pub const DEFAULT_OUTPUT_PREFIX: &str = "附录2：营销现场作业计划审批表";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认模板
    pub template_path: Option<PathBuf>,
    /// 默认输出目录（未设置时为桌面）
    pub output_dir: Option<PathBuf>,
    pub output_prefix: String,
    pub date_format: DateFormat,
    pub row_height: RowHeightPreset,
    pub duplicate_policy: DuplicatePolicy,
    pub font_name: String,
    pub font_size: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PlanError::Config("找不到用户主目录".into()))?;
        Ok(home.join(".config").join("workplan-merge").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            template_path: None,
            output_dir: None,
            output_prefix: DEFAULT_OUTPUT_PREFIX.into(),
            date_format: DateFormat::Slash,
            row_height: RowHeightPreset::Standard,
            duplicate_policy: DuplicatePolicy::FullRow,
            font_name: DEFAULT_FONT_NAME.into(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// 数据单元格样式
    pub fn cell_style(&self) -> CellStyle {
        CellStyle::default().with_font(&self.font_name, self.font_size)
    }

    /// 模板路径（命令行参数优先）
    pub fn resolve_template(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        arg.or_else(|| self.template_path.clone()).ok_or_else(|| {
            PlanError::Config(
                "未指定模板。使用 `--template` 或 `workplan-merge config --set-template <PATH>` 设置".into(),
            )
        })
    }

    /// 输出目录：配置值 → 桌面 → 当前目录
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::desktop_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_template(&mut self, path: PathBuf) -> Result<()> {
        if !path.exists() {
            return Err(PlanError::FileNotFound(path.display().to_string()));
        }
        self.template_path = Some(path);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_prefix, DEFAULT_OUTPUT_PREFIX);
        assert_eq!(config.date_format, DateFormat::Slash);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::FullRow);
        assert_eq!(config.cell_style().font_name, "宋体");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"date_format": "dash", "duplicate_policy": "adjacent-ignoring-sequence"}"#)
                .unwrap();
        assert_eq!(config.date_format, DateFormat::Dash);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::AdjacentIgnoringSequence);
        assert_eq!(config.row_height, RowHeightPreset::Standard);
        assert_eq!(config.font_size, 9.0);
    }

    #[test]
    fn test_config_roundtrip_json() {
        let mut config = Config::default();
        config.row_height = RowHeightPreset::Compact;
        config.output_dir = Some(PathBuf::from("/tmp/out"));
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_template_arg_wins() {
        let mut config = Config::default();
        assert!(config.resolve_template(None).is_err());
        config.template_path = Some(PathBuf::from("a.xlsx"));
        assert_eq!(config.resolve_template(None).unwrap(), PathBuf::from("a.xlsx"));
        assert_eq!(
            config.resolve_template(Some(PathBuf::from("b.xlsx"))).unwrap(),
            PathBuf::from("b.xlsx")
        );
    }

    #[test]
    fn test_output_dir_configured() {
        let mut config = Config::default();
        config.output_dir = Some(PathBuf::from("/data/out"));
        assert_eq!(config.resolve_output_dir(), PathBuf::from("/data/out"));
    }
}
