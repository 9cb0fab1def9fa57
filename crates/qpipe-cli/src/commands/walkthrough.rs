//! Walkthrough command implementation.

use anyhow::Result;
use console::style;

use qpipe_cli::PipelineConfig;
use qpipe_cli::report::{self, WALKTHROUGH};
use qpipe_qkd::{Interception, bit_walkthrough, estimate_qber, sift};

use super::common::save;

/// Print every round of a short exchange.
pub fn execute(config: &PipelineConfig, do_save: bool) -> Result<()> {
    let bb84 = &config.bb84;
    let rounds = bit_walkthrough(bb84.walkthrough_rounds, bb84.p_eve, bb84.p_noise, config.seed)?;

    println!(
        "{} BB84 walkthrough: {} rounds (p_eve={}, p_noise={})\n",
        style("→").cyan().bold(),
        rounds.len(),
        bb84.p_eve,
        bb84.p_noise
    );
    println!(
        "  {:>4}  {:>5} {:>5}  {:>5}  {:>5} {:>5}  {:>5}",
        "#", "a_bit", "a_bas", "eve", "b_bas", "b_bit", "kept"
    );
    for (k, r) in rounds.iter().enumerate() {
        let eve = match r.interception {
            Interception::None => "-".to_string(),
            Interception::InterceptResend { basis, measured } => format!("{basis}{measured}"),
        };
        let kept = if !r.kept {
            style("no").dim()
        } else if r.is_error() {
            style("ERR").red().bold()
        } else {
            style("yes").green()
        };
        println!(
            "  {:>4}  {:>5} {:>5}  {:>5}  {:>5} {:>5}  {:>5}{}",
            k,
            r.alice_bit,
            r.alice_basis,
            eve,
            r.bob_basis,
            r.bob_bit,
            kept,
            if r.noise_flipped { " (flip)" } else { "" }
        );
    }

    let sifted = sift(&rounds);
    println!(
        "\n  Sifted: {} of {}  QBER: {}",
        sifted.len(),
        rounds.len(),
        estimate_qber(&sifted)
    );

    if do_save {
        save(config, WALKTHROUGH, report::walkthrough_csv(&rounds).as_bytes())?;
    }
    Ok(())
}
