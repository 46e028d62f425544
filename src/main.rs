use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use workplan_common::export::excel_core::save_violation_report;
use workplan_merge::{auditor, cli, config, error, naming, pipeline, render, resolver};
use cli::{Cli, Commands};
use config::Config;
use error::{PlanError, Result};
use pipeline::{JobOutcome, MergeJob};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = Config::load()?;

    match cli.command {
        Commands::Merge { files, template, output, date_format, duplicates } => {
            println!("📑 workplan-merge - 合并作业计划\n");

            let template = config.resolve_template(template)?;
            if !template.exists() {
                return Err(PlanError::FileNotFound(template.display().to_string()));
            }
            let output = output.unwrap_or_else(|| {
                naming::default_output_path(
                    &config.resolve_output_dir(),
                    &config.output_prefix,
                    files.first().map(PathBuf::as_path),
                    chrono::Local::now().date_naive(),
                )
            });

            println!("[1/3] 输入文件: {}个", files.len());
            println!("[2/3] 模板: {}", template.display());
            println!("[3/3] 输出: {}\n", output.display());

            let mut job = MergeJob::new(files, template, output);
            job.duplicate_policy = duplicates.unwrap_or(config.duplicate_policy);
            job.render = render::RenderOptions {
                date_format: date_format.unwrap_or(config.date_format),
                row_height: config.row_height.policy(),
                style: config.cell_style(),
            };

            let bar = ProgressBar::new(100);
            if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}") {
                bar.set_style(style);
            }
            let outcome = job.run(&mut |percent: u8, stage: &str| {
                bar.set_position(percent as u64);
                bar.set_message(stage.to_string());
            });
            bar.finish_and_clear();

            match outcome {
                JobOutcome::Success(message) => println!("✅ {}", message),
                JobOutcome::PartialSuccess(message) => println!("⚠️  {}", message),
                JobOutcome::Failure(message) => {
                    println!("❌ {}", message);
                    std::process::exit(1);
                }
            }
        }

        Commands::Check { files } => {
            println!("🔍 workplan-merge - 表格结构检查\n");

            let mut invalid = 0;
            for file in &files {
                print_check(file, &mut invalid);
            }

            println!();
            if invalid == 0 {
                println!("✅ 全部{}个文件结构正确", files.len());
            } else {
                println!("❌ {}个文件中有{}个无法使用", files.len(), invalid);
            }
        }

        Commands::Audit { file, report } => {
            println!("🔎 workplan-merge - 规范检查\n");

            let result = auditor::audit_file(&file)?;
            if !result.is_clean() {
                println!("{:>6}  {:<10}  {:<24}  {:<12}  {:<24}", "行号", "规则", "B列内容", "D列内容", "F列内容");
                for v in &result.violations {
                    println!(
                        "{:>6}  {:<10}  {:<24}  {:<12}  {:<24}",
                        v.row, v.rule.id(), v.values[0], v.values[1], v.values[2]
                    );
                }
                println!();
            }

            if let Some(report_path) = report {
                let source = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                save_violation_report(&report_path, &source, &result.violations)?;
                println!("✔ 检查结果已保存: {}", report_path.display());
            }

            println!("✅ {}", result.summary());
        }

        Commands::Config { set_template, set_output_dir, date_format, row_height, duplicates, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = set_template {
                config.set_template(path)?;
                println!("✔ 已设置默认模板");
            }
            if let Some(dir) = set_output_dir {
                config.output_dir = Some(dir);
                changed = true;
            }
            if let Some(format) = date_format {
                config.date_format = format;
                changed = true;
            }
            if let Some(preset) = row_height {
                config.row_height = preset;
                changed = true;
            }
            if let Some(policy) = duplicates {
                config.duplicate_policy = policy;
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 配置已保存: {}", Config::config_path()?.display());
            }

            if show {
                println!("配置:");
                println!("  模板: {}", display_opt(config.template_path.as_deref()));
                println!("  输出目录: {}", config.resolve_output_dir().display());
                println!("  文件名前缀: {}", config.output_prefix);
                println!("  日期格式: {}", config.date_format);
                println!("  行高方案: {}", config.row_height);
                println!("  查重策略: {}", config.duplicate_policy);
                println!("  字体: {} {}pt", config.font_name, config.font_size);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::new(if verbose { "debug" } else { "warn" });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| PlanError::Logging(e.to_string()))
}

fn print_check(file: &Path, invalid: &mut usize) {
    let name = file.display();
    if !file.exists() {
        println!("✘ {}: 文件不存在", name);
        *invalid += 1;
        return;
    }
    match resolver::resolve_sheet(file) {
        Ok(resolved) => println!(
            "✔ {}: 使用表格「{}」，表头在第{}行，{}行数据",
            name,
            resolved.sheet,
            resolved.header_row(),
            resolved.rows.len()
        ),
        Err(report) => {
            println!("✘ {}: {}", name, report);
            *invalid += 1;
        }
    }
}

fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "未设置".to_string())
}
