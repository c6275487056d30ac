mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::time::Instant;

use logic::{
    BuildStrategy, SessionConfig, SimulationSession, generate_console_report,
    generate_json_report, generate_markdown_report, resolve_seed_inputs, split_csv,
};

#[derive(Debug, Parser)]
#[command(name = "outbreak-tester", version = "0.1.0")]
#[command(about = "Automated QA harness for the outbreak simulation - pure logic, no UI")]
struct Args {
    /// Seeds to run: integers, inclusive `start..end` ranges, or `default`
    /// (comma-separated)
    #[arg(long, default_value = "default")]
    seeds: String,

    /// Automated build strategy driving outpost placement
    #[arg(long, value_enum, default_value_t = BuildStrategy::Balanced)]
    strategy: BuildStrategy,

    /// Run every built-in strategy against every seed
    #[arg(long)]
    all_strategies: bool,

    /// Iterations per seed/strategy pair; iteration i perturbs the seed by i
    #[arg(long, default_value_t = 1)]
    iterations: u64,

    /// Hard cap on simulated days per session
    #[arg(long, default_value_t = 120)]
    max_days: u32,

    /// Synthetic clock granularity in simulated minutes
    #[arg(long, default_value_t = 60.0)]
    tick_minutes: f32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let seeds = resolve_seed_inputs(&split_csv(&args.seeds)).context("resolving seed inputs")?;
    let strategies: Vec<BuildStrategy> = if args.all_strategies {
        BuildStrategy::ALL.to_vec()
    } else {
        vec![args.strategy]
    };

    let total_runs = seeds.len() * strategies.len() * usize::try_from(args.iterations).unwrap_or(1);
    log::info!(
        "running {} session(s): {} seed(s) x {} strategy(ies) x {} iteration(s)",
        total_runs,
        seeds.len(),
        strategies.len(),
        args.iterations
    );
    if args.report == "console" {
        println!(
            "{} {} session(s)...",
            "🦠 Simulating".bright_cyan().bold(),
            total_runs
        );
    }

    let started = Instant::now();
    let mut reports = Vec::with_capacity(total_runs);
    for &seed in &seeds {
        for &strategy in &strategies {
            for iteration in 0..args.iterations {
                let session_seed = seed.wrapping_add(iteration);
                let cfg = SessionConfig::new(session_seed, strategy)
                    .with_max_days(args.max_days)
                    .with_tick_minutes(args.tick_minutes);
                let report = SimulationSession::run(cfg).with_context(|| {
                    format!("session seed {session_seed} strategy {strategy}")
                })?;
                log::debug!(
                    "seed {} [{}]: {:?} after {} day(s)",
                    report.seed,
                    report.strategy,
                    report.outcome,
                    report.days
                );
                reports.push(report);
            }
        }
    }

    match args.report.as_str() {
        "json" => generate_json_report(&reports)?,
        "markdown" => generate_markdown_report(&reports),
        _ => generate_console_report(&reports, started.elapsed()),
    }

    Ok(())
}
