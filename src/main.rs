//! # git-fit — 命令行入口
//!
//! 本文件仅负责日志初始化、设置加载与子命令分发。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use git_fit::compression::{CompressionConfig, FileSelection, OutputFormat};
use git_fit::error::AppError;
use git_fit::session::FormSession;
use git_fit::settings::{self, AppSettings};
use git_fit::size_unit::{SizeInput, SizeUnit};
use git_fit::transport::ReqwestTransport;

#[derive(Debug, Parser)]
#[command(name = "git-fit", version, about = "Compress images to a target size")]
struct Cli {
    /// 设置文件路径（默认位于系统配置目录）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖压缩服务地址
    #[arg(long, global = true, env = "GIT_FIT_API_BASE")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 压缩一张图片
    Compress {
        file: PathBuf,
        /// 目标体积数值
        #[arg(long, default_value = "1")]
        size: String,
        /// 目标体积单位（KB / MB）
        #[arg(long, default_value = "MB", value_parser = parse_unit)]
        unit: SizeUnit,
        /// 输出格式（jpeg / png / gif）
        #[arg(long, default_value = "jpeg", value_parser = parse_format)]
        format: OutputFormat,
        /// JPEG 质量（1-100）
        #[arg(long, default_value_t = 85)]
        quality: u8,
        /// 下载结果并保存到该目录
        #[arg(long)]
        out: Option<PathBuf>,
        /// 复制结果地址到剪贴板
        #[arg(long)]
        copy: bool,
    },
    /// 输出当前的演示对比数据
    Demo,
    /// 检查压缩服务状态
    Health,
}

fn parse_unit(value: &str) -> Result<SizeUnit, String> {
    SizeUnit::parse(value).ok_or_else(|| format!("unknown unit '{}', expected KB or MB", value))
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(value).ok_or_else(|| format!("unknown format '{}', expected jpeg, png or gif", value))
}

fn load_settings(cli: &Cli) -> Result<AppSettings, AppError> {
    let path = cli.config.clone().unwrap_or_else(settings::default_settings_path);
    let mut loaded = AppSettings::load_from_path(&path)?.apply_env_overrides();
    if let Some(base) = cli.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
        loaded.api_base_url = base.to_string();
    }
    log::debug!("已加载设置: {}", path.display());
    Ok(loaded)
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = load_settings(&cli)?;

    match cli.command {
        Command::Compress {
            file,
            size,
            unit,
            format,
            quality,
            out,
            copy,
        } => {
            let session = FormSession::from_settings(&settings)?;
            session.select_file(FileSelection::from_path(&file).await?)?;

            let mut config = CompressionConfig::default();
            config.set_format(format);
            config.set_quality(quality);
            session.set_config(config)?;
            session.apply_size_input(&SizeInput::new(size, unit))?;

            let result = session.submit().await?;
            if let Some(comparison) = session.state().comparison() {
                println!("{} → {}", comparison.before_label, comparison.after_label);
            }
            println!("{}", result.download_url);

            if let Some(dir) = out {
                let path = session.save_result_to(&dir).await?;
                println!("saved to {}", path.display());
            }
            if copy {
                session.copy_result_url().await;
            }
        }
        Command::Demo => {
            let session = FormSession::from_settings(&settings)?;
            let data = session.load_demo().await;
            let json = serde_json::to_string_pretty(&data)
                .map_err(|e| AppError::Storage(format!("failed to serialize comparison: {}", e)))?;
            println!("{}", json);
        }
        Command::Health => {
            let transport = ReqwestTransport::new(
                std::time::Duration::from_secs(settings.connect_timeout_secs),
                std::time::Duration::from_secs(settings.request_timeout_secs),
            )
            .map_err(|e| AppError::Network(e.to_string()))?;
            let status = git_fit::compression::check_health(&transport, &settings.health_endpoint()).await?;
            println!("{} (uptime {})", status.status, status.uptime);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
