//! Shared helpers for CLI commands.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qpipe_cli::PipelineConfig;
use qpipe_cli::report;
use qpipe_qkd::Qber;

/// A steadily ticking spinner with the given message.
pub fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

/// Write one artefact into the configured output directory and report it.
pub fn save(config: &PipelineConfig, name: &str, contents: &[u8]) -> Result<PathBuf> {
    report::ensure_dir(&config.output_dir)?;
    let path = report::write_artefact(&config.output_dir, name, contents)?;
    println!("  Wrote {}", style(path.display()).green());
    Ok(path)
}

/// QBER colored by the decision gate.
pub fn styled_qber(qber: Qber) -> String {
    if qber.passes_gate() {
        style(qber).green().to_string()
    } else {
        style(qber).red().to_string()
    }
}

/// Gate verdict label for a QBER.
pub fn gate_label(qber: Qber) -> &'static str {
    if qber.passes_gate() { "ok" } else { "abort" }
}

/// Fixed-width bar for a value in [0, 1].
pub fn bar(value: f64, width: usize) -> String {
    let filled = ((value.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_label_boundary_proceeds() {
        assert_eq!(gate_label(Qber::Rate(0.0)), "ok");
        assert_eq!(gate_label(Qber::Rate(0.11)), "ok");
        assert_eq!(gate_label(Qber::Rate(0.110_001)), "abort");
        assert_eq!(gate_label(Qber::NoSiftedBits), "abort");
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0, 4), "░░░░");
        assert_eq!(bar(1.0, 4), "████");
        assert_eq!(bar(2.0, 4), "████");
        assert_eq!(bar(0.5, 4), "██░░");
    }
}
