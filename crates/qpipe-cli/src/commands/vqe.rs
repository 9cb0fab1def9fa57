//! VQE command implementation.

use anyhow::Result;
use console::style;

use qpipe_cli::report::{self, VQE_CURVE, VQE_RESULTS_JSON};
use qpipe_cli::{PipelineConfig, VqeReport, run_vqe_stage};

use super::common::{save, spinner};

/// Scan the configured bond lengths and compare with exact energies.
pub fn execute(config: &PipelineConfig, do_save: bool) -> Result<()> {
    let vqe = &config.vqe;
    println!(
        "{} VQE over {} bond length(s) (reps {}, maxiter {}, seed {})",
        style("→").cyan().bold(),
        vqe.bond_lengths.len(),
        vqe.reps,
        vqe.maxiter,
        config.seed
    );

    let spinner = spinner("Optimizing...")?;
    let points = run_vqe_stage(config);
    spinner.finish_and_clear();
    let points = points?;

    println!(
        "\n  {:>8}  {:>14}  {:>14}  {:>10}  {:>5}",
        "R (Å)", "VQE", "exact", "|error|", "iters"
    );
    for p in &points {
        let iters = if p.converged {
            style(p.iterations.to_string()).dim()
        } else {
            style(format!("{}!", p.iterations)).yellow()
        };
        println!(
            "  {:>8.4}  {:>14.8}  {:>14.8}  {:>10.2e}  {:>5}",
            p.bond_length, p.vqe_energy, p.exact_energy, p.absolute_error, iters
        );
    }

    if do_save {
        let vqe_report = VqeReport {
            unit: "Hartree".to_string(),
            reps: vqe.reps,
            maxiter: vqe.maxiter,
            seed: config.seed,
            points,
        };
        save(config, VQE_CURVE, report::vqe_curve_csv(&vqe_report.points).as_bytes())?;
        save(config, VQE_RESULTS_JSON, report::to_json(&vqe_report)?.as_bytes())?;
    }
    Ok(())
}
