// apps/dv_cli/src/commands/run.rs

//! 场景运行命令
//!
//! 读取场景配置，用其中的 mover 推进初始粒子，并按间隔输出粒子位置。

use anyhow::{anyhow, Context, Result};
use clap::Args;
use dv_config::ScenarioConfig;
use dv_io::time::format_model_time;
use dv_mover::{AnyMover, LeRecord, LeStatus, MoverSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::parse_time_arg;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 场景配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 每隔多少步输出一次粒子位置（0 表示只输出最终位置）
    #[arg(long, default_value = "1")]
    pub every: usize,

    /// 覆盖配置中的步数
    #[arg(long)]
    pub steps: Option<usize>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== DriftVel 运行 ===");

    let scenario = ScenarioConfig::from_file(&args.config)
        .with_context(|| format!("无法加载场景 {}", args.config.display()))?;
    let start = parse_time_arg(&scenario.start_time)?;
    let steps = args.steps.unwrap_or(scenario.steps);
    let dt = scenario.time_step;

    let mut set = MoverSet::new();
    for config in &scenario.movers {
        let mover = AnyMover::from_config(config.clone())
            .with_context(|| format!("无效的 mover 配置: {}", config.path.display()))?;
        info!("mover: {} ({})", mover.name(), config.kind);
        set.push(mover);
    }

    let mut les: Vec<LeRecord> = scenario
        .particles
        .iter()
        .map(|seed| LeRecord::surface(seed.x, seed.y, seed.windage).with_depth(seed.z))
        .collect();

    info!(
        "{} 个 mover, {} 个粒子, {} 步 x {} s, 起始 {}",
        set.len(),
        les.len(),
        steps,
        dt,
        format_model_time(start)
    );

    set.prepare_for_model_run()
        .map_err(|f| anyhow!("运行准备失败 [{}]: {}", f.kind, f.message))?;

    let clock = Instant::now();
    print_positions(start, &les);

    for step in 0..steps {
        let t = start + step as f64 * dt;
        set.step(t, dt, &mut les)
            .map_err(|f| anyhow!("第 {} 步 ({}) 失败 [{}]: {}", step, format_model_time(t), f.kind, f.message))?;

        let done = step + 1;
        if (args.every > 0 && done % args.every == 0) || done == steps {
            print_positions(t + dt, &les);
        }
    }

    info!("=== 运行完成: {} 步, 耗时 {:.2} s ===", steps, clock.elapsed().as_secs_f64());
    Ok(())
}

fn print_positions(time: f64, les: &[LeRecord]) {
    println!("t = {}", format_model_time(time));
    for (i, le) in les.iter().enumerate() {
        let note = if le.status == LeStatus::InWater { "" } else { " (不移动)" };
        println!(
            "  #{i:<4} {:>12.6} {:>11.6} z = {:.2}{note}",
            le.position.p.x, le.position.p.y, le.position.z
        );
    }
}
