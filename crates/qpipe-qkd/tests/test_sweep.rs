//! Tests for QBER sweeps, heatmaps and key collection.

use qpipe_qkd::{Qber, collect_key, eve_sweep, qber_heatmap};

#[test]
fn eve_sweep_rises_with_attack_probability() {
    let points = eve_sweep(4000, 0.0, 5, 123).unwrap();
    let first = points.first().unwrap().qber.rate().unwrap();
    let last = points.last().unwrap().qber.rate().unwrap();
    assert_eq!(first, 0.0);
    assert!(last > 0.2, "full attack qber {last}");
}

#[test]
fn eve_sweep_is_reproducible() {
    let a = eve_sweep(300, 0.02, 6, 9).unwrap();
    let b = eve_sweep(300, 0.02, 6, 9).unwrap();
    assert_eq!(a, b);
}

#[test]
fn heatmap_has_grid_shape() {
    let eve = [0.0, 0.5, 1.0];
    let noise = [0.0, 0.1];
    let map = qber_heatmap(200, &eve, &noise, 2, 4).unwrap();
    assert_eq!(map.cells.len(), 3);
    assert!(map.cells.iter().all(|row| row.len() == 2));
    assert_eq!(map.get(0, 0), Some(Qber::Rate(0.0)));
}

#[test]
fn heatmap_corner_cells_are_ordered() {
    let map = qber_heatmap(2000, &[0.0, 1.0], &[0.0, 0.2], 3, 11).unwrap();
    let clean = map.get(0, 0).unwrap().rate().unwrap();
    let worst = map.get(1, 1).unwrap().rate().unwrap();
    assert!(clean < worst);
}

#[test]
fn heatmap_is_reproducible() {
    let a = qber_heatmap(150, &[0.0, 0.4], &[0.0, 0.05], 2, 77).unwrap();
    let b = qber_heatmap(150, &[0.0, 0.4], &[0.0, 0.05], 2, 77).unwrap();
    assert_eq!(a, b);
}

#[test]
fn collected_key_comes_from_clean_sessions() {
    let key = collect_key(128, 512, 0.0, 222, 10).unwrap();
    assert!(key.complete);
    assert_eq!(key.bits.len(), 128);
    assert!(key.bits.iter().all(|&b| b <= 1));
}
