use clap::{Parser, Subcommand};
use std::path::PathBuf;
use workplan_common::layout::RowHeightPreset;
use workplan_common::{DateFormat, DuplicatePolicy};

#[derive(Parser)]
#[command(name = "workplan-merge")]
#[command(about = "营销现场作业计划合并与规范检查工具", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 输出详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 合并多个作业计划表并写入模板
    Merge {
        /// 输入的Excel文件
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 模板文件（默认使用配置中的模板）
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// 输出文件（默认：输出目录/附录2：营销现场作业计划审批表_日期.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 时间列的日期格式 (slash/dash)
        #[arg(long)]
        date_format: Option<DateFormat>,

        /// 查重策略 (full-row/adjacent)
        #[arg(long)]
        duplicates: Option<DuplicatePolicy>,
    },

    /// 只检查输入文件的表格结构
    Check {
        /// 输入的Excel文件
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// 规范检查：不符合规则的单元格标为黄色并保存
    Audit {
        /// 已生成的审批表
        #[arg(required = true)]
        file: PathBuf,

        /// 另存一份检查结果表
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// 显示/修改配置
    Config {
        /// 设置默认模板
        #[arg(long)]
        set_template: Option<PathBuf>,

        /// 设置默认输出目录
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// 设置日期格式 (slash/dash)
        #[arg(long)]
        date_format: Option<DateFormat>,

        /// 设置行高方案 (standard/compact)
        #[arg(long)]
        row_height: Option<RowHeightPreset>,

        /// 设置查重策略 (full-row/adjacent)
        #[arg(long)]
        duplicates: Option<DuplicatePolicy>,

        /// 显示配置
        #[arg(long)]
        show: bool,
    },
}
