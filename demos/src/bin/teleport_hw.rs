//! Teleportation Tomography Demo (IBM Quantum Hardware)
//!
//! Runs the same protocol as `teleport-sim`, but on a real device: connects
//! to IBM Quantum, picks the least-busy operational backend (or a named
//! one), submits all three basis circuits as a single job, and waits out
//! the queue.
//!
//! Requires the `IBM_QUANTUM_TOKEN` environment variable.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use bifrost_adapter_ibm::IbmBackend;
use bifrost_demos::{
    create_spinner, print_header, print_outcome, print_result, print_section, print_success,
};
use bifrost_hal::Backend;
use bifrost_tomo::{StatePrep, TomographyRunner};

#[derive(Parser, Debug)]
#[command(name = "teleport-hw")]
#[command(about = "Run teleportation tomography on IBM Quantum hardware")]
struct Args {
    /// Shots per basis circuit
    #[arg(short, long, default_value = "4096")]
    shots: u32,

    /// Target a specific device instead of the least-busy one
    #[arg(short, long)]
    backend: Option<String>,

    /// Rx preparation angle in radians (default: pi/2)
    #[arg(long)]
    theta: Option<f64>,

    /// Rz preparation angle in radians (default: pi/2)
    #[arg(long)]
    phi: Option<f64>,

    /// Queue wait budget in seconds
    #[arg(long, default_value = "3600")]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    print_header("Teleportation Tomography (IBM Quantum)");

    let spinner = create_spinner("Connecting to IBM Quantum...");
    let backend = match &args.backend {
        Some(name) => IbmBackend::connect(name).await?,
        None => IbmBackend::connect_least_busy().await?,
    };
    spinner.finish_and_clear();

    print_section("Device");
    print_result("Backend", backend.name());
    print_result("Qubits", backend.capabilities().num_qubits);
    let availability = backend.availability().await?;
    if let Some(depth) = availability.queue_depth {
        print_result("Queue depth", depth);
    }

    let default_prep = StatePrep::default();
    let prep = StatePrep::new(
        args.theta.unwrap_or(default_prep.theta),
        args.phi.unwrap_or(default_prep.phi),
    );

    print_section("Protocol Setup");
    print_result("Preparation", format!("rx({:.4}) rz({:.4})", prep.theta, prep.phi));
    print_result("Shots per basis", args.shots);

    let spinner = create_spinner("Waiting for job to complete (hardware queues can be long)...");
    let outcome = TomographyRunner::new(&backend)
        .with_prep(prep)
        .with_shots(args.shots)
        .with_timeout(Duration::from_secs(args.timeout))
        .run()
        .await?;
    spinner.finish_and_clear();

    print_outcome(&outcome);
    print_success("Teleportation tomography complete");

    Ok(())
}
