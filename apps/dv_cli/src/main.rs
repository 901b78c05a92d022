// apps/dv_cli/src/main.rs

//! DriftVel 命令行界面
//!
//! 检查格点时变海流 / 风场文件，查询任意点的速度，并用一组 mover
//! 推进粒子。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// DriftVel 格点速度场工具
#[derive(Parser)]
#[command(name = "dv")]
#[command(author = "DriftVel Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "DriftVel gridded current / wind field tool", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 扫描场文件并显示时间索引
    Scan(commands::scan::ScanArgs),
    /// 查询某点某时刻的速度
    Sample(commands::sample::SampleArgs),
    /// 按场景配置推进粒子
    Run(commands::run::RunArgs),
    /// 把文本场文件转换为二进制格式
    Convert(commands::convert::ConvertArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args),
        Commands::Sample(args) => commands::sample::execute(args),
        Commands::Run(args) => commands::run::execute(args),
        Commands::Convert(args) => commands::convert::execute(args),
    }
}
