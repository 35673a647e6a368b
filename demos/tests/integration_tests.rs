//! End-to-end tests of the teleportation tomography pipeline on the
//! local simulator.

use std::f64::consts::PI;

use bifrost_adapter_sim::SimulatorBackend;
use bifrost_hal::Backend;
use bifrost_qasm3::emit;
use bifrost_tomo::{StatePrep, TomographyRunner, teleportation_circuit, tomography_circuits};

#[tokio::test]
async fn teleports_default_state_to_plus_x() {
    let backend = SimulatorBackend::new().with_seed(42);
    let outcome = TomographyRunner::new(&backend).run().await.unwrap();

    // rx(pi/2) rz(pi/2) from |0> lands on +X. With 4096 shots per basis
    // the sampling error stays well inside these bounds.
    assert!(outcome.bloch.x > 0.95, "bloch = {}", outcome.bloch);
    assert!(outcome.bloch.y.abs() < 0.1, "bloch = {}", outcome.bloch);
    assert!(outcome.bloch.z.abs() < 0.1, "bloch = {}", outcome.bloch);
    assert!(outcome.bloch.norm() < 1.05);
}

#[tokio::test]
async fn teleports_computational_basis_states() {
    let backend = SimulatorBackend::new().with_seed(1);

    // |0> teleports to <Z> = +1 exactly; no rotation means no sampling noise
    // on the Z axis.
    let zero = TomographyRunner::new(&backend)
        .with_prep(StatePrep::new(0.0, 0.0))
        .with_shots(1024)
        .run()
        .await
        .unwrap();
    assert_eq!(zero.bloch.z, 1.0);

    // rx(pi) prepares |1>.
    let one = TomographyRunner::new(&backend)
        .with_prep(StatePrep::new(PI, 0.0))
        .with_shots(1024)
        .run()
        .await
        .unwrap();
    assert_eq!(one.bloch.z, -1.0);
}

#[tokio::test]
async fn corrections_act_per_shot() {
    // Without the conditional corrections the output qubit would be maximally
    // mixed for any input. A Bloch norm near 1 is only possible if each shot's
    // correction used that shot's own measurement outcomes.
    let backend = SimulatorBackend::new().with_seed(3);
    let outcome = TomographyRunner::new(&backend)
        .with_prep(StatePrep::new(PI / 3.0, PI / 5.0))
        .run()
        .await
        .unwrap();

    assert!(outcome.bloch.norm() > 0.9, "bloch = {}", outcome.bloch);
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let a = TomographyRunner::new(&SimulatorBackend::new().with_seed(99))
        .run()
        .await
        .unwrap();
    let b = TomographyRunner::new(&SimulatorBackend::new().with_seed(99))
        .run()
        .await
        .unwrap();

    assert_eq!(a.bloch, b.bloch);
}

#[tokio::test]
async fn basis_circuits_emit_valid_qasm() {
    let circuits = tomography_circuits(&StatePrep::default()).unwrap();
    for circuit in &circuits {
        let qasm = emit(circuit).unwrap();
        assert!(qasm.contains("OPENQASM 3.0;"));
        assert!(qasm.contains("qubit[3] q;"));
        assert!(qasm.contains("bit[1] tomo;"));
        assert!(qasm.contains("if (crx == 1) {"));
        assert!(qasm.contains("if (crz == 1) {"));
        assert!(qasm.contains("tomo[0] = measure q[2];"));
    }
}

#[tokio::test]
async fn simulator_validates_teleportation_circuit() {
    let backend = SimulatorBackend::new();
    let circuit = teleportation_circuit(&StatePrep::default()).unwrap();
    let validation = backend.validate(&circuit).await.unwrap();
    assert!(validation.is_valid());
}
