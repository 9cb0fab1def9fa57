//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - BB84-gated VQE pipeline",
        style("qpipe").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qpipe-qkd  BB84 simulation, sifting and QBER gating");
    println!("  qpipe-vqe  H2 Hamiltonian, exact solver and VQE");
    println!("  qpipe-cli  Pipeline orchestration and command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
