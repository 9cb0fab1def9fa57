//! QBER decision gate.

/// Highest QBER at which key material is still accepted.
///
/// 0.11 is the intercept-resend detectability bound for BB84; the
/// interval is closed, so a QBER of exactly 0.11 proceeds.
pub const QBER_THRESHOLD: f64 = 0.11;

/// Decide whether downstream processing may proceed.
///
/// Returns `true` iff `qber <= QBER_THRESHOLD`. NaN never proceeds.
pub fn decision_gate(qber: f64) -> bool {
    qber <= QBER_THRESHOLD
}
