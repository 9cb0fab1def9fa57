//! Heatmap command implementation.

use anyhow::Result;
use console::style;

use qpipe_cli::report::{self, QBER_HEATMAP};
use qpipe_cli::{PipelineConfig, run_heatmap};

use super::common::{save, spinner};

/// Print the mean-QBER grid, interception down, noise across.
pub fn execute(config: &PipelineConfig, do_save: bool) -> Result<()> {
    let hm = &config.heatmap;
    println!(
        "{} QBER heatmap: {} x {} cells, {} repeats, {} rounds each",
        style("→").cyan().bold(),
        hm.eve_steps,
        hm.noise_steps,
        hm.repeats,
        config.bb84.rounds
    );

    let spinner = spinner("Simulating sessions...")?;
    let map = run_heatmap(config);
    spinner.finish_and_clear();
    let map = map?;

    print!("\n  {:>6} ", "p_eve");
    for p_noise in &map.noise_grid {
        print!(" {p_noise:>7.3}");
    }
    println!();
    for (i, p_eve) in map.eve_grid.iter().enumerate() {
        print!("  {p_eve:>6.3} ");
        for j in 0..map.noise_grid.len() {
            match map.get(i, j).and_then(|q| q.rate()) {
                Some(rate) => print!(" {rate:>7.4}"),
                None => print!(" {:>7}", "n/a"),
            }
        }
        println!();
    }

    if do_save {
        save(config, QBER_HEATMAP, report::heatmap_csv(&map).as_bytes())?;
    }
    Ok(())
}
