//! Run command implementation.

use anyhow::Result;
use console::style;

use qpipe_cli::{Bb84Summary, PipelineConfig, PipelineOutcome, run_pipeline};

use super::common::{spinner, styled_qber};

/// Execute the full pipeline. Returns `false` if the gate aborted the run.
pub fn execute(config: &PipelineConfig) -> Result<bool> {
    println!(
        "{} Running pipeline (seed {}, output {})",
        style("→").cyan().bold(),
        style(config.seed).yellow(),
        style(config.output_dir.display()).green()
    );

    let spinner = spinner("Starting...")?;
    let outcome = run_pipeline(config, |stage| spinner.set_message(stage.to_string()));
    spinner.finish_and_clear();

    match outcome? {
        PipelineOutcome::Aborted { summary, artefacts } => {
            print_summary(&summary);
            println!(
                "\n{} QBER above {:.2} or undefined: channel rejected, VQE stage skipped",
                style("✗").red().bold(),
                summary.threshold
            );
            print_artefacts(&artefacts);
            Ok(false)
        }
        PipelineOutcome::Completed(report) => {
            print_summary(&report.summary);
            println!(
                "  Key: {} bytes from {} session(s){}",
                report.key_bytes,
                report.key.sessions,
                if report.key.complete {
                    String::new()
                } else {
                    style(" (short)").yellow().to_string()
                }
            );

            println!("\n{}", style("VQE results (Hartree):").bold());
            println!(
                "  {:>8}  {:>14}  {:>14}  {:>10}",
                "R (Å)", "VQE", "exact", "|error|"
            );
            for p in &report.points {
                println!(
                    "  {:>8.4}  {:>14.8}  {:>14.8}  {:>10.2e}",
                    p.bond_length, p.vqe_energy, p.exact_energy, p.absolute_error
                );
            }

            if let Some(map) = &report.heatmap {
                println!(
                    "\n  Heatmap: {} x {} cells, {} repeats",
                    map.eve_grid.len(),
                    map.noise_grid.len(),
                    map.repeats
                );
            }

            println!("\n{} Pipeline complete", style("✓").green().bold());
            print_artefacts(&report.artefacts);
            Ok(true)
        }
    }
}

fn print_summary(summary: &Bb84Summary) {
    println!("\n{}", style("BB84:").bold());
    println!(
        "  Rounds: {}  p_eve: {}  p_noise: {}",
        summary.rounds, summary.p_eve, summary.p_noise
    );
    println!(
        "  Kept: {} ({:.1}%)  Errors: {}",
        summary.kept,
        summary.sift_ratio * 100.0,
        summary.errors
    );
    println!("  QBER: {}", styled_qber(summary.qber));
    println!("  QBER with full interception: {}", summary.qber_full_attack);
}

fn print_artefacts(artefacts: &[std::path::PathBuf]) {
    println!("\n  Artefacts:");
    for path in artefacts {
        println!("    {}", style(path.display()).green());
    }
}
