// CrashGame Simulator CLI
// Sweeps ladder configs, reports weighted deck RTP, checks Monte Carlo CI coverage
//
// Usage:
//   cargo run --release --bin crashsim -- run -i configs/                 # every CSV in a folder
//   cargo run --release --bin crashsim -- run -i ladder.csv -r 1000 100000 --analytical
//   cargo run --release --bin crashsim -- decks --target 0.97             # fit the global scale
//   cargo run --release --bin crashsim -- coverage --runs 100 --rounds 100000

mod monte_carlo;
mod report;

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crashgame_engine::aggregate::{breakdown, overall_expected_value};
use crashgame_engine::export::{results_to_csv, results_to_json};
use crashgame_engine::ingest::{read_config_dir, read_config_file};
use crashgame_engine::presets::default_decks;
use crashgame_engine::stats::Z_95;
use crashgame_engine::*;

use monte_carlo::{run_coverage, CoverageSpec};
use report::{print_deck_table, print_rounds_summary};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "crashsim", version, about = "CrashGame ladder RTP simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep one config CSV, or every CSV in a folder
    Run(RunArgs),
    /// Weighted deck RTP, optionally fitting the global scale to a target
    Decks(DecksArgs),
    /// Share of seeded runs whose 95% CI contains the analytical RTP
    Coverage(CoverageArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Config CSV (Stage, Multiplier, P_black) or a folder of them
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long, default_value = "sim-results")]
    output: PathBuf,
    #[arg(short, long, num_args = 1.., default_values_t = [10_000_u64, 100_000, 1_000_000])]
    rounds: Vec<u64>,
    #[arg(short, long, default_value_t = 123)]
    seed: u32,
    #[arg(short, long, default_value_t = 1.0)]
    bet: f64,
    /// Closed-form statistics instead of Monte Carlo draws
    #[arg(long)]
    analytical: bool,
    /// Report the sample standard deviation of the draws
    #[arg(long)]
    sample_dispersion: bool,
    /// Write JSON instead of CSV
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DecksArgs {
    /// JSON array of decks; the built-in five-deck board when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,
    #[arg(short, long, default_value_t = 1.0)]
    global_scale: f64,
    /// Fit the global scale so the overall RTP hits this value
    #[arg(short, long)]
    target: Option<f64>,
}

#[derive(Args, Debug)]
struct CoverageArgs {
    #[arg(long, default_value_t = 100)]
    runs: usize,
    #[arg(long, default_value_t = 100_000)]
    rounds: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(short, long, default_value_t = 2.0)]
    multiplier: f64,
    #[arg(short, long, default_value_t = 0.5)]
    probability: f64,
    #[arg(short, long, default_value_t = 1.0)]
    bet: f64,
    #[arg(short, long, default_value = "sim-results")]
    output: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CRASHSIM_LOG")
        .unwrap_or_else(|_| EnvFilter::new("crashsim=info,crashgame_engine=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(&args),
        Command::Decks(args) => decks(&args),
        Command::Coverage(args) => coverage(&args),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let configs = if args.input.is_dir() {
        read_config_dir(&args.input)
            .with_context(|| format!("failed to read configs from {}", args.input.display()))?
    } else {
        let name = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        let config = read_config_file(&args.input)
            .with_context(|| format!("failed to read config {}", args.input.display()))?;
        vec![(name, config)]
    };
    if configs.is_empty() {
        bail!("no config CSV files found in {}", args.input.display());
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let mode = if args.analytical { SimulationMode::Analytical } else { SimulationMode::Simulated };
    let dispersion = if args.sample_dispersion { Dispersion::Sample } else { Dispersion::Bernoulli };
    println!("\n  CrashGame Simulator");
    println!(
        "  PRNG: Mulberry32 | Seed: {} | Bet: {} | Mode: {:?} | Rounds: {:?}\n",
        args.seed, args.bet, mode, args.rounds
    );

    for (name, config) in configs {
        let request = SimulationRequest {
            config,
            rounds: args.rounds.clone(),
            seed: args.seed,
            bet: args.bet,
            mode,
            dispersion,
        };
        let start = Instant::now();
        let rows = simulate(&request).with_context(|| format!("simulation of {name} failed"))?;
        info!(config = %name, rows = rows.len(), elapsed_ms = start.elapsed().as_millis() as u64, "swept config");

        print_rounds_summary(&name, &summarize_by_rounds(&rows));

        let (body, ext) = if args.json {
            (results_to_json(&rows)?, "json")
        } else {
            (results_to_csv(&rows)?, "csv")
        };
        let path = args.output.join(format!("Sim_{name}.{ext}"));
        write_file(&path, &body)?;
        println!("  [OK] Wrote {}\n", path.display());
    }
    Ok(())
}

fn decks(args: &DecksArgs) -> Result<()> {
    let decks: Vec<Deck> = match &args.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse decks from {}", path.display()))?
        }
        None => default_decks(),
    };
    let mut ctx = AggregationContext::with_global_scale(decks, args.global_scale)?;

    if let Some(target) = args.target {
        let scale = apply_fitted_scale(&mut ctx, target)
            .with_context(|| format!("could not fit global scale to target RTP {target}"))?;
        info!(target, scale, "applied fitted global scale");
    }

    println!();
    print_deck_table(&ctx.decks, &breakdown(&ctx), ctx.global_scale(), overall_expected_value(&ctx));
    Ok(())
}

fn coverage(args: &CoverageArgs) -> Result<()> {
    let spec = CoverageSpec {
        stage: Stage::new(1, args.multiplier, args.probability),
        rounds: args.rounds,
        bet: args.bet,
        runs: args.runs,
        base_seed: args.seed,
    };
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the UNIX epoch")?
        .as_millis();
    let timestamp = ts.to_string();

    let start = Instant::now();
    let report = run_coverage(&spec, timestamp.clone())?;

    println!("\n  Coverage: m={} p={} rounds={} runs={}", args.multiplier, args.probability, args.rounds, report.n_runs);
    if let Some(spread) = &report.spread {
        println!(
            "  Expected RTP {:.4} | mean {:.4} ± {:.4} | range [{:.4}, {:.4}]",
            report.expected_rtp,
            spread.mean,
            Z_95 * spread.std_error,
            spread.lowest,
            spread.highest,
        );
    }
    println!(
        "  Inside CI {:.1}%  {}",
        report.coverage_rate * 100.0,
        if report.pass { "PASS" } else { "FAIL" },
    );
    println!("  Elapsed: {:.1}s", start.elapsed().as_secs_f64());

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let path = args.output.join(format!("coverage-{timestamp}.json"));
    let json = serde_json::to_string_pretty(&report).context("failed to serialize coverage report")?;
    write_file(&path, &json)?;
    println!("  Results saved to: {}\n", path.display());

    if !report.pass {
        std::process::exit(1);
    }
    Ok(())
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
