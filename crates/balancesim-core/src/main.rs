//! BalanceSim CLI: compare request dispatch policies on synthetic load.

use balancesim_core::config::SimConfig;
use balancesim_core::engine::EngineOptions;
use balancesim_core::generator::{self, DistributionStats, LoadDistribution};
use balancesim_core::{export, report, trace};
use balancesim_policies::{available_policies, PolicyKind};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "balancesim",
    about = "Compare request dispatch policies on synthetic load",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one policy over one load sequence.
    Run {
        /// Path to TOML configuration file.
        #[arg(short, long)]
        config: PathBuf,
        /// Dispatch policy name.
        #[arg(short, long, default_value = "round_robin")]
        policy: String,
        /// Replay a pre-generated load sequence instead of sampling one.
        #[arg(short, long)]
        loads: Option<PathBuf>,
        /// Format of the load sequence file (text, json).
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Distribution kind to sample from (defaults to the first configured).
        #[arg(short, long)]
        distribution: Option<String>,
        /// Output results to JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare every enabled policy across every configured distribution.
    Compare {
        /// Path to TOML configuration file.
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for results.json and the CSV exports.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Generate a load sequence and print its statistics.
    GenLoads {
        /// Distribution kind (normal, log_normal, exponential, uniform).
        #[arg(short, long, default_value = "normal")]
        distribution: String,
        /// Number of load values.
        #[arg(long, default_value = "10000")]
        count: usize,
        /// Random seed.
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Normal mean.
        #[arg(long)]
        mean: Option<f64>,
        /// Normal standard deviation.
        #[arg(long)]
        std: Option<f64>,
        /// Log-normal mu.
        #[arg(long)]
        mu: Option<f64>,
        /// Log-normal sigma.
        #[arg(long)]
        sigma: Option<f64>,
        /// Exponential scale.
        #[arg(long)]
        scale: Option<f64>,
        /// Uniform lower bound.
        #[arg(long)]
        low: Option<f64>,
        /// Uniform upper bound.
        #[arg(long)]
        high: Option<f64>,
        /// Output file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (text, json).
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List available policies.
    ListPolicies,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            policy,
            loads,
            format,
            distribution,
            output,
        } => {
            let sim_config = load_config(&config);
            let kind = PolicyKind::from_name(&policy).unwrap_or_else(|| {
                fail(&format!(
                    "Unknown policy: {}. Available: {:?}",
                    policy,
                    available_policies()
                ))
            });
            let policy = sim_config
                .build_policy(kind)
                .unwrap_or_else(|e| fail(&format!("Error building policy: {}", e)));

            let (label, sequence) = match loads {
                Some(path) => {
                    let sequence = trace::load_sequence(&path, &format)
                        .unwrap_or_else(|e| fail(&format!("Error loading loads: {}", e)));
                    (path.display().to_string(), sequence)
                }
                None => {
                    let dist = pick_distribution(&sim_config, distribution.as_deref());
                    let mut rng = generator::seeded_rng(sim_config.simulation.seed);
                    let sequence = generator::generate_loads(
                        &dist,
                        sim_config.simulation.num_requests,
                        &mut rng,
                    )
                    .unwrap_or_else(|e| fail(&format!("Error generating loads: {}", e)));
                    (dist.label().to_string(), sequence)
                }
            };

            let options = EngineOptions {
                on_invalid_load: sim_config.simulation.on_invalid_load,
                record_history: sim_config.simulation.record_history,
                cancel: None,
            };
            info!(policy = kind.name(), requests = sequence.len(), "running");
            let result = balancesim_core::run_simulation(policy, &sequence, &label, options)
                .unwrap_or_else(|e| fail(&format!("Simulation failed: {}", e)));
            println!("{}", report::format_table(&result));

            if let Some(output_path) = output {
                export::write_json(&result, &output_path)
                    .unwrap_or_else(|e| fail(&format!("Error writing output: {}", e)));
                println!("Results written to {}", output_path.display());
            }
        }
        Commands::Compare { config, output_dir } => {
            let sim_config = load_config(&config);
            let comparison = balancesim_core::compare_policies(&sim_config)
                .unwrap_or_else(|e| fail(&format!("Comparison failed: {}", e)));

            println!("{}", report::format_comparison_table(&comparison.rows));
            println!("{}", report::format_ranking(&comparison.rankings));

            if let Some(dir) = output_dir {
                export::write_all(&comparison.reports, &dir)
                    .unwrap_or_else(|e| fail(&format!("Error writing output: {}", e)));
                println!("Results written to {}", dir.display());
            }
        }
        Commands::GenLoads {
            distribution,
            count,
            seed,
            mean,
            std,
            mu,
            sigma,
            scale,
            low,
            high,
            output,
            format,
        } => {
            let mut dist = LoadDistribution::from_name(&distribution)
                .unwrap_or_else(|e| fail(&e.to_string()));
            match &mut dist {
                LoadDistribution::Normal { mean: m, std: s } => {
                    *m = mean.unwrap_or(*m);
                    *s = std.unwrap_or(*s);
                }
                LoadDistribution::LogNormal { mu: m, sigma: s } => {
                    *m = mu.unwrap_or(*m);
                    *s = sigma.unwrap_or(*s);
                }
                LoadDistribution::Exponential { scale: s } => {
                    *s = scale.unwrap_or(*s);
                }
                LoadDistribution::Uniform { low: l, high: h } => {
                    *l = low.unwrap_or(*l);
                    *h = high.unwrap_or(*h);
                }
            }

            let mut rng = generator::seeded_rng(seed);
            let loads = generator::generate_loads(&dist, count, &mut rng)
                .unwrap_or_else(|e| fail(&format!("Error generating loads: {}", e)));
            let stats = DistributionStats::from_values(&loads);
            print!("{}", report::format_distribution_stats(dist.label(), &stats));

            if let Some(output_path) = output {
                let format = format
                    .parse::<trace::SequenceFormat>()
                    .unwrap_or_else(|e| fail(&e.to_string()));
                trace::write_sequence(&loads, &output_path, format)
                    .unwrap_or_else(|e| fail(&format!("Error writing loads: {}", e)));
                println!(
                    "Generated {} loads to {}",
                    loads.len(),
                    output_path.display()
                );
            }
        }
        Commands::ListPolicies => {
            println!("Available dispatch policies:");
            for name in available_policies() {
                println!("  - {}", name);
            }
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn load_config(path: &Path) -> SimConfig {
    SimConfig::from_file(path).unwrap_or_else(|e| fail(&format!("Error loading config: {}", e)))
}

/// The configured distribution of the requested kind, or the kind's defaults
/// if the config does not list it. Without a kind, the first configured one.
fn pick_distribution(config: &SimConfig, kind: Option<&str>) -> LoadDistribution {
    match kind {
        Some(kind) => {
            let wanted = LoadDistribution::from_name(kind).unwrap_or_else(|e| fail(&e.to_string()));
            config
                .distributions
                .iter()
                .find(|d| d.kind() == wanted.kind())
                .copied()
                .unwrap_or(wanted)
        }
        // Validation guarantees at least one distribution.
        None => config.distributions[0],
    }
}
