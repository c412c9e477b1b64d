//! CLI entry point for the warp odds simulator

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use warp_sim::{
    config::{GachaKind, COST_PER_PULL},
    odds::{category_odds, expected_pulls_per_five_star, pity_curve},
    run_and_aggregate_with_cancel, CancelToken, SimRequest, SimulationSummary,
};

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "warp-sim")]
#[command(version = "1.0")]
#[command(about = "Monte Carlo odds for limited character and light cone warps", long_about = None)]
struct Args {
    /// Request file (YAML or JSON); flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pickup 5-star characters wanted
    #[arg(long)]
    characters: Option<u32>,

    /// Pickup 5-star light cones wanted
    #[arg(long)]
    light_cones: Option<u32>,

    /// Starting currency
    #[arg(long)]
    currency: Option<u64>,

    /// Starting pull tickets
    #[arg(long)]
    tickets: Option<u64>,

    /// Pulls since the last 5-star on the banner being continued
    #[arg(long)]
    pity: Option<u32>,

    /// The next 5-star is guaranteed to be the pickup
    #[arg(long)]
    guaranteed: Option<bool>,

    /// Number of simulations to run
    #[arg(short, long)]
    num_sims: Option<usize>,

    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for parallel runs
    #[arg(long)]
    threads: Option<usize>,

    /// Use parallel processing
    #[arg(short, long, default_value = "false")]
    parallel: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Show timing information
    #[arg(short, long, default_value = "false")]
    timing: bool,

    /// Cancel the run after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Debug: print the 5-star pity curve of a banner and exit
    #[arg(long)]
    debug_pity: Option<GachaKind>,
}

impl Args {
    fn request(&self) -> anyhow::Result<SimRequest> {
        let mut request = match &self.config {
            Some(path) => SimRequest::from_file(path)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("loading request from {}", path.display()))?,
            None => SimRequest::default(),
        };

        if let Some(v) = self.characters {
            request.target_pickup_characters = v;
        }
        if let Some(v) = self.light_cones {
            request.target_pickup_light_cones = v;
        }
        if let Some(v) = self.currency {
            request.initial_currency = v;
        }
        if let Some(v) = self.tickets {
            request.initial_tickets = v;
        }
        if let Some(v) = self.pity {
            request.initial_pity5 = v;
        }
        if let Some(v) = self.guaranteed {
            request.initial_guaranteed_pickup = v;
        }
        if let Some(v) = self.num_sims {
            request.num_simulations = v;
        }
        if self.seed.is_some() {
            request.seed = self.seed;
        }
        if self.threads.is_some() {
            request.threads = self.threads;
        }
        Ok(request)
    }
}

fn print_pity_curve(kind: GachaKind) {
    println!("============================================================");
    println!("{} BANNER 5-STAR PITY CURVE", kind.label().to_uppercase());
    println!("============================================================");
    println!("{:>5} {:>9} {:>9} {:>9} {:>9}", "pull", "rate", "4-star", "p(hit)", "cum");
    for step in pity_curve(kind) {
        let odds = category_odds(kind, step.pull - 1);
        println!(
            "{:>5} {:>8.2}% {:>8.2}% {:>8.3}% {:>8.2}%",
            step.pull,
            step.rate * 100.0,
            (odds[1] + odds[2]) * 100.0,
            step.probability * 100.0,
            step.cumulative * 100.0
        );
    }
    println!();
    println!("Expected pulls per 5-star: {:.2}", expected_pulls_per_five_star(kind));
}

fn print_text(request: &SimRequest, summary: &SimulationSummary) {
    println!("=== Warp Simulation Results ===");
    println!("Simulations: {}", summary.simulations);
    println!(
        "Targets: {} character(s), {} light cone(s)",
        request.target_pickup_characters, request.target_pickup_light_cones
    );
    println!(
        "Budget: {} currency + {} tickets ({} pulls)",
        request.initial_currency,
        request.initial_tickets,
        request.initial_currency / COST_PER_PULL + request.initial_tickets
    );
    println!();
    println!("Success probability: {:.2}%", summary.success_probability);
    println!(
        "Avg exchange tickets (successful runs): {:.2}",
        summary.avg_exchange_tickets_among_successes
    );
    println!();

    if summary.pulls_distribution.is_empty() {
        println!("No unlimited-budget run reached the goal within the iteration cap.");
    } else {
        println!("--- Pulls needed with unlimited currency ---");
        println!("{:>5} {:>10} {:>12} {:>9}", "", "pulls", "currency", "tickets");
        for (label, row) in &summary.pulls_distribution {
            println!(
                "{:>5} {:>10.1} {:>12.0} {:>9.0}",
                label, row.pulls, row.currency_consumed, row.tickets_earned
            );
        }
    }

    if summary.capped_budgeted > 0 || summary.capped_unbounded > 0 {
        println!();
        println!(
            "Capped runs left out: {} budgeted, {} unlimited",
            summary.capped_budgeted, summary.capped_unbounded
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(kind) = args.debug_pity {
        print_pity_curve(kind);
        return Ok(());
    }

    let request = args.request()?;

    let cancel = CancelToken::new();
    if let Some(secs) = args.timeout_secs {
        let watchdog = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            warn!("timeout of {}s reached, cancelling", secs);
            watchdog.cancel();
        });
    }

    let start = Instant::now();
    let result = run_and_aggregate_with_cancel(&request, args.parallel, &cancel);
    let elapsed = start.elapsed();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            match args.output {
                OutputFormat::Text => eprintln!("Error: {}", e),
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }))
                }
            }
            std::process::exit(1);
        }
    };

    match args.output {
        OutputFormat::Text => {
            print_text(&request, &summary);
            if args.timing {
                println!();
                println!("--- Performance ---");
                println!("Total time: {:.3}s", elapsed.as_secs_f64());
                println!(
                    "Per simulation: {:.3}ms",
                    elapsed.as_secs_f64() * 1000.0 / summary.simulations as f64
                );
                println!(
                    "Simulations/sec: {:.0}",
                    summary.simulations as f64 / elapsed.as_secs_f64()
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "parallel": args.parallel,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "request": request,
                "stats": summary,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("serializing results")?
            );
        }
    }

    info!("finished {} simulations in {:.3}s", summary.simulations, elapsed.as_secs_f64());
    Ok(())
}
