//! Bifrost Demo Suite
//!
//! Runnable demonstrations of teleportation tomography:
//!
//! - **teleport-sim**: full protocol on the local statevector simulator
//! - **teleport-hw**: the same protocol on the least-busy IBM Quantum device

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use bifrost_tomo::TomographyOutcome;

/// Create a spinner for long-running operations (queue waits, polling).
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}").unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print the standard tomography report: backend, job, and the three
/// Bloch components at three decimal places.
pub fn print_outcome(outcome: &TomographyOutcome) {
    print_section("Tomography Result");
    print_result("Backend", &outcome.backend);
    print_result("Job", &outcome.job_id);
    print_result("Shots per basis", outcome.shots);
    print_result("<X>", format!("{:+.3}", outcome.bloch.x));
    print_result("<Y>", format!("{:+.3}", outcome.bloch.y));
    print_result("<Z>", format!("{:+.3}", outcome.bloch.z));
    print_result("Bloch norm", format!("{:.3}", outcome.bloch.norm()));
}
