use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use metes_config::{AppConfig, ConfigError};
use metes_core::Direction;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod job;
mod summary;

/// 读取 AutoCAD 的 metes and bounds 报告并输出格式规范的法律描述。
#[derive(Debug, Parser)]
#[command(name = "metes", version)]
pub struct Cli {
    /// 被描述对象的类型，例如 'Temporary Construction Easement'
    #[arg(long, default_value = "")]
    pub kind: String,
    /// 引测点到起点的方位，格式 N12d34m56sE
    #[arg(long)]
    pub cdir: Option<String>,
    /// 沿 `cdir` 方位自引测点到起点的距离
    #[arg(long, default_value_t = 0.0)]
    pub cdist: f64,
    #[arg(long)]
    pub lot: Option<String>,
    #[arg(long)]
    pub block: Option<String>,
    /// 起点（或引测点）所在地块角的方向，如 northwest、E
    #[arg(long, value_parser = parse_direction)]
    pub origin: Direction,
    /// 分区名称
    #[arg(long, default_value = "")]
    pub sub: String,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub county: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    /// 显式指定配置文件
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// 以前一段的真实出口切线判定衔接关系
    #[arg(long)]
    pub thread_tangents: bool,
    /// 负角方位直接归一化，不做 `|θ| + π` 反射
    #[arg(long)]
    pub normalize_angles: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// AutoCAD 报告文件
    pub report: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    Direction::from_name(value).map_err(|err| err.to_string())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!(error = %err, "生成法律描述失败");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (config, fallback) = load_configuration(cli.config.as_deref())?;
    init_logging(&config);
    if let Some(err) = fallback {
        warn!(error = %err, "加载默认配置失败，使用内建默认值");
    }
    info!(report = %cli.report.display(), "启动 metes");

    let output = job::run(cli, &config)?;
    println!("{output}");
    Ok(())
}

/// 显式指定的配置加载失败即报错；自动发现失败时退回内建默认值，并把错误交给调用方在日志就绪后报告。
fn load_configuration(explicit: Option<&Path>) -> Result<(AppConfig, Option<ConfigError>)> {
    if let Some(path) = explicit {
        let config = AppConfig::from_file(path)
            .with_context(|| format!("无法加载配置 {}", path.display()))?;
        return Ok((config, None));
    }
    Ok(match AppConfig::discover() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    })
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout 只留给描述文本
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
