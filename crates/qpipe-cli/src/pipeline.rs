//! End-to-end pipeline: BB84 gate, key derivation, VQE scan, artefacts.
//!
//! Stages run in a fixed order so a seed reproduces every artefact:
//!
//! 1. simulator sanity check
//! 2. gated BB84 session (configured `p_eve`) and full-attack comparison,
//!    both seeded with `seed`
//! 3. interception sweep (point `k` seeded `seed + k + 1`) and walkthrough
//! 4. decision gate; on abort only the BB84 artefacts are written
//! 5. key collection from attack-free sessions on their own seed stream
//! 6. VQE scan (per-point seeds mixed from `seed`), sealed with the key
//! 7. optional QBER heatmap

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use qpipe_qkd::{
    Bb84Session, CollectedKey, QBER_THRESHOLD, Qber, QberHeatmap, SweepPoint, bit_walkthrough,
    collect_key, eve_sweep, linspace, qber_heatmap, simulate_bb84,
};
use qpipe_vqe::{VqePoint, compute_vqe_curve, hadamard_sanity};

use crate::config::PipelineConfig;
use crate::envelope::{SessionKey, open, open_raw, seal};
use crate::error::{PipelineError, PipelineResult};
use crate::report::{
    self, BB84_SUMMARY, QBER_HEATMAP, QBER_SWEEP, VQE_CURVE, VQE_RESULTS_ENC, VQE_RESULTS_JSON,
    WALKTHROUGH,
};

/// Pipeline stage, reported to progress observers as it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sanity,
    Bb84,
    Sweep,
    Key,
    Vqe,
    Heatmap,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Sanity => "Checking simulator",
            Stage::Bb84 => "Simulating BB84 exchange",
            Stage::Sweep => "Sweeping interception probability",
            Stage::Key => "Collecting key material",
            Stage::Vqe => "Scanning bond lengths",
            Stage::Heatmap => "Building QBER heatmap",
        };
        f.write_str(label)
    }
}

/// Outcome of the BB84 stage, written to `bb84_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bb84Summary {
    pub rounds: usize,
    pub p_eve: f64,
    pub p_noise: f64,
    pub seed: u64,
    /// Basis-matched rounds of the gated session.
    pub kept: usize,
    /// Disagreements among the kept rounds.
    pub errors: usize,
    pub sift_ratio: f64,
    /// QBER of the gated session.
    pub qber: Qber,
    /// QBER of the same exchange with every round intercepted.
    pub qber_full_attack: Qber,
    pub threshold: f64,
    /// Gate decision.
    pub proceed: bool,
}

impl Bb84Summary {
    /// Summarize a gated session next to its full-attack counterpart.
    pub fn new(gated: &Bb84Session, full_attack: &Bb84Session) -> Self {
        Self {
            rounds: gated.n,
            p_eve: gated.p_eve,
            p_noise: gated.p_noise,
            seed: gated.seed,
            kept: gated.kept(),
            errors: gated.errors(),
            sift_ratio: gated.sift_ratio(),
            qber: gated.qber,
            qber_full_attack: full_attack.qber,
            threshold: QBER_THRESHOLD,
            proceed: gated.qber.passes_gate(),
        }
    }
}

/// The encrypted VQE report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeReport {
    pub unit: String,
    pub reps: usize,
    pub maxiter: usize,
    pub seed: u64,
    pub points: Vec<VqePoint>,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub summary: Bb84Summary,
    pub key_bytes: usize,
    pub key: CollectedKey,
    pub points: Vec<VqePoint>,
    pub heatmap: Option<QberHeatmap>,
    pub artefacts: Vec<PathBuf>,
}

/// Result of [`run_pipeline`].
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// The gate rejected the channel; only BB84 artefacts were written.
    Aborted {
        summary: Bb84Summary,
        artefacts: Vec<PathBuf>,
    },
    /// Every stage ran.
    Completed(Box<PipelineReport>),
}

/// Sessions produced by the BB84 stage.
#[derive(Debug, Clone)]
pub struct Bb84Stage {
    pub gated: Bb84Session,
    pub full_attack: Bb84Session,
    pub sweep: Vec<SweepPoint>,
}

/// Gated session, full-attack comparison and interception sweep.
pub fn run_bb84_stage(config: &PipelineConfig) -> PipelineResult<Bb84Stage> {
    let bb84 = &config.bb84;
    let gated = simulate_bb84(bb84.rounds, bb84.p_eve, bb84.p_noise, config.seed)?;
    let full_attack = simulate_bb84(bb84.rounds, 1.0, bb84.p_noise, config.seed)?;
    let sweep = eve_sweep(bb84.rounds, bb84.p_noise, bb84.sweep_steps, config.seed)?;
    Ok(Bb84Stage {
        gated,
        full_attack,
        sweep,
    })
}

/// QBER heatmap over the configured grid.
pub fn run_heatmap(config: &PipelineConfig) -> PipelineResult<QberHeatmap> {
    let hm = &config.heatmap;
    let eve_grid = linspace(0.0, 1.0, hm.eve_steps);
    let noise_grid = linspace(0.0, hm.noise_max, hm.noise_steps);
    Ok(qber_heatmap(
        config.bb84.rounds,
        &eve_grid,
        &noise_grid,
        hm.repeats,
        config.seed,
    )?)
}

/// VQE scan over the configured bond lengths.
pub fn run_vqe_stage(config: &PipelineConfig) -> PipelineResult<Vec<VqePoint>> {
    let vqe = &config.vqe;
    Ok(compute_vqe_curve(
        &vqe.bond_lengths,
        vqe.reps,
        vqe.maxiter,
        config.seed,
    )?)
}

/// Run every stage and write artefacts into `config.output_dir`.
///
/// `on_stage` is called as each stage starts.
pub fn run_pipeline<F>(config: &PipelineConfig, mut on_stage: F) -> PipelineResult<PipelineOutcome>
where
    F: FnMut(Stage),
{
    config.validate()?;
    let dir = config.output_dir.as_path();
    report::ensure_dir(dir)?;
    let mut artefacts = Vec::new();

    on_stage(Stage::Sanity);
    let sanity = hadamard_sanity();
    if sanity.outcome != 0 {
        warn!(p_one = sanity.p_one, "simulator sanity check failed");
    }

    on_stage(Stage::Bb84);
    let stage = run_bb84_stage(config)?;
    let summary = Bb84Summary::new(&stage.gated, &stage.full_attack);
    info!(
        qber = %summary.qber,
        full_attack = %summary.qber_full_attack,
        proceed = summary.proceed,
        "BB84 stage complete"
    );

    on_stage(Stage::Sweep);
    let walkthrough = bit_walkthrough(
        config.bb84.walkthrough_rounds,
        config.bb84.p_eve,
        config.bb84.p_noise,
        config.seed,
    )?;
    artefacts.push(report::write_artefact(
        dir,
        BB84_SUMMARY,
        report::to_json(&summary)?.as_bytes(),
    )?);
    artefacts.push(report::write_artefact(
        dir,
        QBER_SWEEP,
        report::sweep_csv(&stage.sweep).as_bytes(),
    )?);
    artefacts.push(report::write_artefact(
        dir,
        WALKTHROUGH,
        report::walkthrough_csv(&walkthrough).as_bytes(),
    )?);

    if !summary.proceed {
        warn!(qber = %summary.qber, threshold = QBER_THRESHOLD, "channel rejected, aborting");
        return Ok(PipelineOutcome::Aborted { summary, artefacts });
    }

    on_stage(Stage::Key);
    let key = collect_key(
        config.bb84.key_min_bits,
        config.bb84.rounds,
        config.bb84.p_noise,
        config.seed,
        config.bb84.key_max_hops,
    )?;
    let session_key = SessionKey::from_bits(&key.bits)?;

    on_stage(Stage::Vqe);
    let points = run_vqe_stage(config)?;
    let vqe_report = VqeReport {
        unit: "Hartree".to_string(),
        reps: config.vqe.reps,
        maxiter: config.vqe.maxiter,
        seed: config.seed,
        points: points.clone(),
    };
    artefacts.push(report::write_artefact(
        dir,
        VQE_CURVE,
        report::vqe_curve_csv(&points).as_bytes(),
    )?);
    artefacts.push(report::write_artefact(
        dir,
        VQE_RESULTS_JSON,
        report::to_json(&vqe_report)?.as_bytes(),
    )?);
    let sealed = seal(&vqe_report, &session_key)?;
    let enc_path = report::write_artefact(dir, VQE_RESULTS_ENC, &sealed)?;
    verify_sealed(&enc_path, &vqe_report, &session_key)?;
    artefacts.push(enc_path);

    let heatmap = if config.heatmap.enabled {
        on_stage(Stage::Heatmap);
        let map = run_heatmap(config)?;
        artefacts.push(report::write_artefact(
            dir,
            QBER_HEATMAP,
            report::heatmap_csv(&map).as_bytes(),
        )?);
        Some(map)
    } else {
        None
    };

    info!(artefacts = artefacts.len(), dir = %dir.display(), "pipeline complete");
    Ok(PipelineOutcome::Completed(Box::new(PipelineReport {
        summary,
        key_bytes: session_key.len(),
        key,
        points,
        heatmap,
        artefacts,
    })))
}

/// Re-read the sealed file and check it opens to the same plaintext.
fn verify_sealed(path: &Path, report: &VqeReport, key: &SessionKey) -> PipelineResult<()> {
    let on_disk = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let expected = serde_json::to_vec(report)?;
    if open_raw(&on_disk, key) != expected {
        return Err(PipelineError::RoundTripMismatch {
            path: path.to_path_buf(),
        });
    }
    let reopened: VqeReport = open(&on_disk, key)?;
    if reopened.points.len() != report.points.len() {
        return Err(PipelineError::RoundTripMismatch {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
