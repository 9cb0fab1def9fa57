//! End-to-end pipeline tests against a temporary output directory.

use std::fs;
use std::path::Path;

use qpipe_cli::report::{
    BB84_SUMMARY, QBER_HEATMAP, QBER_SWEEP, VQE_CURVE, VQE_RESULTS_ENC, VQE_RESULTS_JSON,
    WALKTHROUGH,
};
use qpipe_cli::{
    Bb84Summary, PipelineConfig, PipelineError, PipelineOutcome, SessionKey, Stage, VqeReport,
    open, run_pipeline,
};
use qpipe_qkd::{bit_walkthrough, collect_key, sift, simulate_bb84};
use tempfile::TempDir;

fn quick_config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.output_dir = dir.to_path_buf();
    config.vqe.bond_lengths = vec![0.5, 0.735];
    config.vqe.maxiter = 100;
    config
}

#[test]
fn clean_channel_completes_and_writes_every_artefact() {
    let tmp = TempDir::new().unwrap();
    let config = quick_config(tmp.path());

    let mut stages = Vec::new();
    let outcome = run_pipeline(&config, |s| stages.push(s)).unwrap();

    let PipelineOutcome::Completed(report) = outcome else {
        panic!("clean channel should pass the gate");
    };
    assert!(report.summary.proceed);
    assert_eq!(report.points.len(), 2);
    assert!(report.key_bytes >= 1);
    assert!(report.heatmap.is_none());
    assert_eq!(
        stages,
        vec![Stage::Sanity, Stage::Bb84, Stage::Sweep, Stage::Key, Stage::Vqe]
    );

    for name in [
        BB84_SUMMARY,
        QBER_SWEEP,
        WALKTHROUGH,
        VQE_CURVE,
        VQE_RESULTS_JSON,
        VQE_RESULTS_ENC,
    ] {
        assert!(tmp.path().join(name).exists(), "missing {name}");
    }
    assert!(!tmp.path().join(QBER_HEATMAP).exists());
    assert_eq!(report.artefacts.len(), 6);
}

#[test]
fn sealed_results_open_with_rederived_key() {
    let tmp = TempDir::new().unwrap();
    let config = quick_config(tmp.path());
    run_pipeline(&config, |_| {}).unwrap();

    let bb84 = &config.bb84;
    let key = collect_key(
        bb84.key_min_bits,
        bb84.rounds,
        bb84.p_noise,
        config.seed,
        bb84.key_max_hops,
    )
    .unwrap();
    let key = SessionKey::from_bits(&key.bits).unwrap();

    let sealed = fs::read(tmp.path().join(VQE_RESULTS_ENC)).unwrap();
    let opened: VqeReport = open(&sealed, &key).unwrap();

    let plain: VqeReport =
        serde_json::from_str(&fs::read_to_string(tmp.path().join(VQE_RESULTS_JSON)).unwrap())
            .unwrap();
    assert_eq!(opened.unit, "Hartree");
    assert_eq!(opened.points.len(), plain.points.len());
    for (a, b) in opened.points.iter().zip(&plain.points) {
        assert_eq!(a.bond_length, b.bond_length);
        assert!((a.vqe_energy - b.vqe_energy).abs() < 1e-12);
    }

    // The ciphertext is not the plaintext JSON
    assert!(serde_json::from_slice::<VqeReport>(&sealed).is_err());
}

#[test]
fn key_material_is_not_the_published_exchange() {
    let tmp = TempDir::new().unwrap();
    let config = quick_config(tmp.path());
    let PipelineOutcome::Completed(report) = run_pipeline(&config, |_| {}).unwrap() else {
        panic!("expected a completed run");
    };
    let key = &report.key.bits;
    let bb84 = &config.bb84;

    let gated = simulate_bb84(bb84.rounds, bb84.p_eve, bb84.p_noise, config.seed).unwrap();
    let n = key.len().min(gated.sifted.alice.len());
    assert_ne!(key[..n], gated.sifted.alice[..n]);

    let clean = simulate_bb84(bb84.rounds, 0.0, bb84.p_noise, config.seed).unwrap();
    let n = key.len().min(clean.sifted.alice.len());
    assert_ne!(key[..n], clean.sifted.alice[..n]);

    // walkthrough.csv exposes its sifted bits in plaintext
    let trace = bit_walkthrough(bb84.walkthrough_rounds, bb84.p_eve, bb84.p_noise, config.seed)
        .unwrap();
    let shown = sift(&trace).alice;
    assert!(shown.len() >= 4);
    assert_ne!(key[..shown.len()], shown[..]);
}

#[test]
fn full_interception_aborts_before_vqe() {
    let tmp = TempDir::new().unwrap();
    let mut config = quick_config(tmp.path());
    config.bb84.p_eve = 1.0;

    let outcome = run_pipeline(&config, |_| {}).unwrap();
    let PipelineOutcome::Aborted { summary, artefacts } = outcome else {
        panic!("full interception should fail the gate");
    };
    assert!(!summary.proceed);
    assert!(summary.qber.rate().unwrap() > 0.11);
    assert_eq!(artefacts.len(), 3);

    assert!(tmp.path().join(BB84_SUMMARY).exists());
    assert!(tmp.path().join(QBER_SWEEP).exists());
    assert!(tmp.path().join(WALKTHROUGH).exists());
    assert!(!tmp.path().join(VQE_CURVE).exists());
    assert!(!tmp.path().join(VQE_RESULTS_ENC).exists());
}

#[test]
fn summary_json_matches_outcome() {
    let tmp = TempDir::new().unwrap();
    let config = quick_config(tmp.path());
    let PipelineOutcome::Completed(report) = run_pipeline(&config, |_| {}).unwrap() else {
        panic!("expected a completed run");
    };

    let text = fs::read_to_string(tmp.path().join(BB84_SUMMARY)).unwrap();
    let summary: Bb84Summary = serde_json::from_str(&text).unwrap();
    assert_eq!(summary.rounds, 512);
    assert_eq!(summary.kept, report.summary.kept);
    assert_eq!(summary.errors, report.summary.errors);
    assert_eq!(summary.proceed, report.summary.proceed);
    assert_eq!(summary.qber.is_defined(), report.summary.qber.is_defined());
    assert_eq!(summary.threshold, 0.11);
}

#[test]
fn same_seed_reproduces_artefacts() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    run_pipeline(&quick_config(a.path()), |_| {}).unwrap();
    run_pipeline(&quick_config(b.path()), |_| {}).unwrap();

    for name in [BB84_SUMMARY, QBER_SWEEP, WALKTHROUGH, VQE_CURVE, VQE_RESULTS_ENC] {
        assert_eq!(
            fs::read(a.path().join(name)).unwrap(),
            fs::read(b.path().join(name)).unwrap(),
            "{name} differs between identical runs"
        );
    }
}

#[test]
fn heatmap_written_when_enabled() {
    let tmp = TempDir::new().unwrap();
    let mut config = quick_config(tmp.path());
    config.vqe.bond_lengths = vec![0.735];
    config.bb84.rounds = 128;
    config.heatmap.enabled = true;
    config.heatmap.eve_steps = 3;
    config.heatmap.noise_steps = 2;
    config.heatmap.repeats = 1;

    let PipelineOutcome::Completed(report) = run_pipeline(&config, |_| {}).unwrap() else {
        panic!("expected a completed run");
    };
    let map = report.heatmap.unwrap();
    assert_eq!(map.cells.len(), 3);

    let csv = fs::read_to_string(tmp.path().join(QBER_HEATMAP)).unwrap();
    assert_eq!(csv.lines().count(), 1 + 3 * 2);
    assert!(csv.starts_with("p_eve,p_noise,mean_qber\n"));
}

#[test]
fn invalid_config_is_rejected_before_any_output() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("never-created");
    let mut config = quick_config(&out);
    config.bb84.p_noise = 1.5;

    let err = run_pipeline(&config, |_| {}).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert!(!out.exists());
}

#[test]
fn yaml_config_file_drives_the_run() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("artefacts");
    let path = tmp.path().join("qpipe.yaml");
    fs::write(
        &path,
        format!(
            "seed: 5\noutput_dir: {}\nbb84:\n  rounds: 512\n  p_eve: 1.0\n",
            out.display()
        ),
    )
    .unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(config.seed, 5);
    assert_eq!(config.vqe.reps, 2);

    let outcome = run_pipeline(&config, |_| {}).unwrap();
    assert!(matches!(outcome, PipelineOutcome::Aborted { .. }));
    assert!(out.join(BB84_SUMMARY).exists());
}
