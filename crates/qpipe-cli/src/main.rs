//! qpipe command-line interface.
//!
//! Runs the quantum-secured VQE pipeline end to end, or any single stage
//! of it for inspection.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use qpipe_cli::PipelineConfig;

mod commands;

use commands::{bb84, heatmap, run, sanity, sweep, version, vqe, walkthrough};

/// qpipe - BB84-gated VQE pipeline for the H2 molecule
#[derive(Parser)]
#[command(name = "qpipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Global seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output directory for artefacts
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: BB84 gate, key, VQE scan, sealed results
    Run {
        /// Also build the QBER heatmap
        #[arg(long)]
        heatmap: bool,
    },

    /// Simulate one gated BB84 exchange and apply the decision gate
    Bb84 {
        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<usize>,

        /// Interception probability
        #[arg(long)]
        p_eve: Option<f64>,

        /// Channel bit-flip probability
        #[arg(long)]
        p_noise: Option<f64>,

        /// Write bb84_summary.json to the output directory
        #[arg(long)]
        save: bool,
    },

    /// QBER as a function of the interception probability
    Sweep {
        /// Number of rounds per session
        #[arg(short, long)]
        rounds: Option<usize>,

        /// Channel bit-flip probability
        #[arg(long)]
        p_noise: Option<f64>,

        /// Number of interception probabilities in [0, 1]
        #[arg(long)]
        steps: Option<usize>,

        /// Write qber_sweep.csv to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Mean QBER over an interception x noise grid
    Heatmap {
        /// Grid points along the interception axis
        #[arg(long)]
        eve_steps: Option<usize>,

        /// Grid points along the noise axis
        #[arg(long)]
        noise_steps: Option<usize>,

        /// Largest noise probability on the grid
        #[arg(long)]
        noise_max: Option<f64>,

        /// Sessions averaged per cell
        #[arg(long)]
        repeats: Option<usize>,

        /// Write qber_heatmap.csv to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Print a round-by-round BB84 trace
    Walkthrough {
        /// Number of rounds to trace
        #[arg(short, long)]
        rounds: Option<usize>,

        /// Interception probability
        #[arg(long)]
        p_eve: Option<f64>,

        /// Channel bit-flip probability
        #[arg(long)]
        p_noise: Option<f64>,

        /// Write walkthrough.csv to the output directory
        #[arg(long)]
        save: bool,
    },

    /// VQE ground-state energies over a set of bond lengths
    Vqe {
        /// Bond length in Angstrom (repeatable)
        #[arg(short, long = "bond-length")]
        bond_lengths: Vec<f64>,

        /// Ansatz depth
        #[arg(long)]
        reps: Option<usize>,

        /// Optimizer iteration limit per bond length
        #[arg(long)]
        maxiter: Option<usize>,

        /// Write vqe_curve.csv and vqe_results.json to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Check the state-vector kernels with H·H|0⟩
    Sanity,

    /// Show version information
    Version,
}

impl Cli {
    /// Layer the flags given on the command line over `config`.
    fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }

        match &self.command {
            Commands::Run { heatmap } => {
                if *heatmap {
                    config.heatmap.enabled = true;
                }
            }
            Commands::Bb84 {
                rounds,
                p_eve,
                p_noise,
                ..
            } => {
                if let Some(r) = rounds {
                    config.bb84.rounds = *r;
                }
                apply_channel(config, *p_eve, *p_noise);
            }
            Commands::Walkthrough {
                rounds,
                p_eve,
                p_noise,
                ..
            } => {
                if let Some(r) = rounds {
                    config.bb84.walkthrough_rounds = *r;
                }
                apply_channel(config, *p_eve, *p_noise);
            }
            Commands::Sweep {
                rounds,
                p_noise,
                steps,
                ..
            } => {
                if let Some(r) = rounds {
                    config.bb84.rounds = *r;
                }
                if let Some(p) = p_noise {
                    config.bb84.p_noise = *p;
                }
                if let Some(s) = steps {
                    config.bb84.sweep_steps = *s;
                }
            }
            Commands::Heatmap {
                eve_steps,
                noise_steps,
                noise_max,
                repeats,
                ..
            } => {
                if let Some(s) = eve_steps {
                    config.heatmap.eve_steps = *s;
                }
                if let Some(s) = noise_steps {
                    config.heatmap.noise_steps = *s;
                }
                if let Some(m) = noise_max {
                    config.heatmap.noise_max = *m;
                }
                if let Some(r) = repeats {
                    config.heatmap.repeats = *r;
                }
            }
            Commands::Vqe {
                bond_lengths,
                reps,
                maxiter,
                ..
            } => {
                if !bond_lengths.is_empty() {
                    config.vqe.bond_lengths = bond_lengths.clone();
                }
                if let Some(r) = reps {
                    config.vqe.reps = *r;
                }
                if let Some(m) = maxiter {
                    config.vqe.maxiter = *m;
                }
            }
            Commands::Sanity | Commands::Version => {}
        }
    }

    /// File, then flags, then environment; validated.
    fn resolve_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }
}

fn apply_channel(config: &mut PipelineConfig, p_eve: Option<f64>, p_noise: Option<f64>) {
    if let Some(p) = p_eve {
        config.bb84.p_eve = p;
    }
    if let Some(p) = p_noise {
        config.bb84.p_noise = p;
    }
}

fn init_logging(verbose: u8, config_level: &str) {
    let level = match verbose {
        0 => config_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over both the flag and the configuration
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose, &config.log_level);

    // Execute command
    let result = match cli.command {
        Commands::Run { .. } => match run::execute(&config) {
            Ok(false) => std::process::exit(2),
            other => other.map(|_| ()),
        },
        Commands::Bb84 { save, .. } => bb84::execute(&config, save),
        Commands::Sweep { save, .. } => sweep::execute(&config, save),
        Commands::Heatmap { save, .. } => heatmap::execute(&config, save),
        Commands::Walkthrough { save, .. } => walkthrough::execute(&config, save),
        Commands::Vqe { save, .. } => vqe::execute(&config, save),
        Commands::Sanity => sanity::execute(),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
