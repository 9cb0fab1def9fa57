//! Sanity command implementation.

use anyhow::Result;
use console::style;

use qpipe_vqe::hadamard_sanity;

/// Run H·H|0⟩ and check that it measures 0.
pub fn execute() -> Result<()> {
    let outcome = hadamard_sanity();
    println!("  H·H|0⟩ → {} (P(1) = {:.3e})", outcome.outcome, outcome.p_one);
    if !outcome.passed() {
        anyhow::bail!("simulator sanity check failed: expected outcome 0");
    }
    println!("{} Simulator OK", style("✓").green().bold());
    Ok(())
}
