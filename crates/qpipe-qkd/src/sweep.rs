//! Parameter sweeps and key collection built on repeated sessions.
//!
//! Every session in a sweep gets its own seed derived from the caller's
//! seed, so sweep points are independent of evaluation order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QkdError, QkdResult, check_probability};
use crate::simulator::simulate_bb84;
use crate::sifting::Qber;

/// `steps` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let delta = (end - start) / (steps - 1) as f64;
            (0..steps)
                .map(|k| if k == steps - 1 { end } else { start + delta * k as f64 })
                .collect()
        }
    }
}

/// QBER measured at one interception probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Interception probability.
    pub p_eve: f64,
    /// Resulting QBER.
    pub qber: Qber,
}

/// QBER as a function of the interception probability.
///
/// Samples `steps` points of `p_eve` over [0, 1]; point `k` is simulated
/// with seed `seed + k + 1`.
pub fn eve_sweep(rounds: usize, p_noise: f64, steps: usize, seed: u64) -> QkdResult<Vec<SweepPoint>> {
    check_probability("p_noise", p_noise)?;
    if steps == 0 {
        return Err(QkdError::InvalidParameter(
            "eve sweep needs at least one step".into(),
        ));
    }

    linspace(0.0, 1.0, steps)
        .into_iter()
        .enumerate()
        .map(|(k, p_eve)| {
            let session = simulate_bb84(rounds, p_eve, p_noise, seed.wrapping_add(k as u64 + 1))?;
            Ok(SweepPoint {
                p_eve,
                qber: session.qber,
            })
        })
        .collect()
}

/// Mean QBER over a grid of (interception, noise) probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QberHeatmap {
    /// Interception probabilities (rows).
    pub eve_grid: Vec<f64>,
    /// Noise probabilities (columns).
    pub noise_grid: Vec<f64>,
    /// Sessions averaged per cell.
    pub repeats: usize,
    /// `cells[i][j]` is the mean QBER at (`eve_grid[i]`, `noise_grid[j]`).
    pub cells: Vec<Vec<Qber>>,
}

impl QberHeatmap {
    /// Cell at row `eve_idx`, column `noise_idx`.
    pub fn get(&self, eve_idx: usize, noise_idx: usize) -> Option<Qber> {
        self.cells.get(eve_idx)?.get(noise_idx).copied()
    }
}

/// Build a QBER heatmap by repeated simulation.
///
/// Each cell averages the defined QBERs of its `repeats` sessions. Sessions
/// with no sifted bits are left out of the mean; a cell where every
/// session had none is [`Qber::NoSiftedBits`].
pub fn qber_heatmap(
    rounds: usize,
    eve_grid: &[f64],
    noise_grid: &[f64],
    repeats: usize,
    seed: u64,
) -> QkdResult<QberHeatmap> {
    for &p in eve_grid {
        check_probability("p_eve", p)?;
    }
    for &p in noise_grid {
        check_probability("p_noise", p)?;
    }
    if repeats == 0 {
        return Err(QkdError::InvalidParameter(
            "heatmap needs at least one repeat per cell".into(),
        ));
    }

    let mut cells = Vec::with_capacity(eve_grid.len());
    for (i, &p_eve) in eve_grid.iter().enumerate() {
        let mut row = Vec::with_capacity(noise_grid.len());
        for (j, &p_noise) in noise_grid.iter().enumerate() {
            let mut sum = 0.0;
            let mut defined = 0usize;
            for rep in 0..repeats {
                let stream = ((i * noise_grid.len() + j) * repeats + rep) as u64;
                let session = simulate_bb84(rounds, p_eve, p_noise, mix_seed(seed, stream))?;
                if let Qber::Rate(r) = session.qber {
                    sum += r;
                    defined += 1;
                }
            }
            let cell = if defined == 0 {
                Qber::NoSiftedBits
            } else {
                Qber::Rate(sum / defined as f64)
            };
            row.push(cell);
        }
        cells.push(row);
    }

    debug!(
        rows = eve_grid.len(),
        cols = noise_grid.len(),
        repeats,
        "built QBER heatmap"
    );

    Ok(QberHeatmap {
        eve_grid: eve_grid.to_vec(),
        noise_grid: noise_grid.to_vec(),
        repeats,
        cells,
    })
}

/// Sifted key bits gathered from one or more attack-free sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedKey {
    /// Alice's sifted bits, truncated to the requested length.
    pub bits: Vec<u8>,
    /// Number of sessions that were run.
    pub sessions: usize,
    /// Whether the requested length was reached.
    pub complete: bool,
}

/// Domain tag separating key sessions from every other use of `seed`.
const KEY_STREAM: u64 = 0x6b65_795f_6d61_7465;

/// Seed of key session `hop`.
///
/// Mixed from `seed ^ KEY_STREAM`, so no key session replays the gated
/// session, a sweep point or a heatmap cell run with the same `seed`.
pub fn key_session_seed(seed: u64, hop: usize) -> u64 {
    mix_seed(seed ^ KEY_STREAM, hop as u64)
}

/// Gather at least `min_bits` sifted bits from attack-free sessions.
///
/// Session `hop` is seeded with [`key_session_seed`]; collection stops
/// after `max_hops` sessions even if the key is still short.
pub fn collect_key(
    min_bits: usize,
    rounds: usize,
    p_noise: f64,
    seed: u64,
    max_hops: usize,
) -> QkdResult<CollectedKey> {
    check_probability("p_noise", p_noise)?;

    let mut bits = Vec::with_capacity(min_bits);
    let mut sessions = 0;
    while bits.len() < min_bits && sessions < max_hops {
        let session = simulate_bb84(rounds, 0.0, p_noise, key_session_seed(seed, sessions))?;
        bits.extend_from_slice(&session.sifted.alice);
        sessions += 1;
    }

    let complete = bits.len() >= min_bits;
    if complete {
        bits.truncate(min_bits);
    } else {
        warn!(
            collected = bits.len(),
            min_bits, sessions, "key collection stopped short"
        );
    }

    Ok(CollectedKey {
        bits,
        sessions,
        complete,
    })
}

/// SplitMix64 finaliser over `seed` and a stream index.
fn mix_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed ^ stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
