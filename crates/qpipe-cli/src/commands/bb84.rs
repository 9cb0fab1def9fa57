//! BB84 command implementation.

use anyhow::Result;
use console::style;

use qpipe_cli::report::{self, BB84_SUMMARY};
use qpipe_cli::{Bb84Summary, PipelineConfig, run_bb84_stage};

use super::common::{save, styled_qber};

/// Simulate the gated exchange and print the decision.
pub fn execute(config: &PipelineConfig, do_save: bool) -> Result<()> {
    let bb84 = &config.bb84;
    println!(
        "{} Simulating {} BB84 rounds (p_eve={}, p_noise={}, seed {})",
        style("→").cyan().bold(),
        bb84.rounds,
        bb84.p_eve,
        bb84.p_noise,
        config.seed
    );

    let stage = run_bb84_stage(config)?;
    let summary = Bb84Summary::new(&stage.gated, &stage.full_attack);

    println!(
        "  Kept: {} / {} ({:.1}%)",
        summary.kept,
        summary.rounds,
        summary.sift_ratio * 100.0
    );
    println!("  Errors: {}", summary.errors);
    println!("  Intercepted rounds: {}", stage.gated.intercepted());
    println!("  QBER: {}", styled_qber(summary.qber));
    println!("  QBER with full interception: {}", summary.qber_full_attack);

    if summary.proceed {
        println!(
            "\n{} QBER at or below {:.2}: proceed",
            style("✓").green().bold(),
            summary.threshold
        );
    } else {
        println!(
            "\n{} QBER above {:.2} or undefined: abort",
            style("✗").red().bold(),
            summary.threshold
        );
    }

    if do_save {
        save(config, BB84_SUMMARY, report::to_json(&summary)?.as_bytes())?;
    }
    Ok(())
}
