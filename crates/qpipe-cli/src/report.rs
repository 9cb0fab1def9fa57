//! Artefact rendering: CSV data series and JSON documents.
//!
//! CSV files carry the series a plotting tool consumes. An undefined QBER
//! is written as an empty field, never as 0.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use qpipe_qkd::{Bb84Round, Interception, Qber, QberHeatmap, SweepPoint};
use qpipe_vqe::VqePoint;

use crate::error::{PipelineError, PipelineResult};

pub const BB84_SUMMARY: &str = "bb84_summary.json";
pub const QBER_SWEEP: &str = "qber_sweep.csv";
pub const QBER_HEATMAP: &str = "qber_heatmap.csv";
pub const WALKTHROUGH: &str = "walkthrough.csv";
pub const VQE_CURVE: &str = "vqe_curve.csv";
pub const VQE_RESULTS_JSON: &str = "vqe_results.json";
pub const VQE_RESULTS_ENC: &str = "vqe_results.enc";

fn qber_field(qber: Qber) -> String {
    match qber {
        Qber::Rate(r) => format!("{r:.6}"),
        Qber::NoSiftedBits => String::new(),
    }
}

/// QBER as a function of the interception probability.
pub fn sweep_csv(points: &[SweepPoint]) -> String {
    let mut out = String::from("p_eve,qber\n");
    for p in points {
        let _ = writeln!(out, "{:.6},{}", p.p_eve, qber_field(p.qber));
    }
    out
}

/// Heatmap in long form, one row per (p_eve, p_noise) cell.
pub fn heatmap_csv(map: &QberHeatmap) -> String {
    let mut out = String::from("p_eve,p_noise,mean_qber\n");
    for (i, &p_eve) in map.eve_grid.iter().enumerate() {
        for (j, &p_noise) in map.noise_grid.iter().enumerate() {
            let cell = map.get(i, j).unwrap_or(Qber::NoSiftedBits);
            let _ = writeln!(out, "{p_eve:.6},{p_noise:.6},{}", qber_field(cell));
        }
    }
    out
}

/// Round-by-round protocol trace.
pub fn walkthrough_csv(rounds: &[Bb84Round]) -> String {
    let mut out = String::from(
        "round,alice_bit,alice_basis,bob_basis,bob_bit,eve_basis,eve_bit,noise_flipped,kept\n",
    );
    for (k, r) in rounds.iter().enumerate() {
        let (eve_basis, eve_bit) = match r.interception {
            Interception::None => (String::new(), String::new()),
            Interception::InterceptResend { basis, measured } => {
                (basis.to_string(), measured.to_string())
            }
        };
        let _ = writeln!(
            out,
            "{k},{},{},{},{},{eve_basis},{eve_bit},{},{}",
            r.alice_bit,
            r.alice_basis,
            r.bob_basis,
            r.bob_bit,
            u8::from(r.noise_flipped),
            u8::from(r.kept),
        );
    }
    out
}

/// VQE and exact energies per bond length.
pub fn vqe_curve_csv(points: &[VqePoint]) -> String {
    let mut out =
        String::from("bond_length,vqe_energy,exact_energy,absolute_error,iterations,converged\n");
    for p in points {
        let _ = writeln!(
            out,
            "{:.4},{:.10},{:.10},{:.3e},{},{}",
            p.bond_length,
            p.vqe_energy,
            p.exact_energy,
            p.absolute_error,
            p.iterations,
            p.converged
        );
    }
    out
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `contents` to `dir/name`, returning the full path.
pub fn write_artefact(dir: &Path, name: &str, contents: &[u8]) -> PipelineResult<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents).map_err(|source| PipelineError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Create the output directory if needed.
pub fn ensure_dir(dir: &Path) -> PipelineResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
