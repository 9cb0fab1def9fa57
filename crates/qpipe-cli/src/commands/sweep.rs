//! Sweep command implementation.

use anyhow::Result;
use console::style;

use qpipe_cli::PipelineConfig;
use qpipe_cli::report::{self, QBER_SWEEP};
use qpipe_qkd::eve_sweep;

use super::common::{bar, gate_label, save};

/// Print QBER against the interception probability.
pub fn execute(config: &PipelineConfig, do_save: bool) -> Result<()> {
    let bb84 = &config.bb84;
    println!(
        "{} Sweeping p_eve over {} points ({} rounds, p_noise={})",
        style("→").cyan().bold(),
        bb84.sweep_steps,
        bb84.rounds,
        bb84.p_noise
    );

    let points = eve_sweep(bb84.rounds, bb84.p_noise, bb84.sweep_steps, config.seed)?;

    println!("\n  {:>6}  {:>8}", "p_eve", "QBER");
    for p in &points {
        match p.qber.rate() {
            Some(rate) => {
                // Bars are scaled so a full intercept-resend attack (~0.25) fills them
                let label = gate_label(p.qber);
                let marker = if p.qber.passes_gate() {
                    style(label).green()
                } else {
                    style(label).red()
                };
                println!(
                    "  {:>6.3}  {:>8.4}  {}  {}",
                    p.p_eve,
                    rate,
                    bar(rate * 4.0, 20),
                    marker
                );
            }
            None => println!("  {:>6.3}  {:>8}", p.p_eve, style("n/a").dim()),
        }
    }

    if do_save {
        save(config, QBER_SWEEP, report::sweep_csv(&points).as_bytes())?;
    }
    Ok(())
}
