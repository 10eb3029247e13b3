//! Orchestrator tests: several actor instances against one server.

use load_actor::{PhaseDecl, WorkloadConfig, WorkloadRunner};
use test_utils::{refused_endpoint, RecordingServer};

fn workload(base_url: String, actors: u32, repeat: u64) -> WorkloadConfig {
    WorkloadConfig {
        name: "runner".to_string(),
        description: String::new(),
        base_url,
        actors,
        timeout_secs: 5,
        seed: Some(11),
        phases: vec![PhaseDecl {
            nop: false,
            route: Some("/ping".to_string()),
            operation: Some("GET".to_string()),
            repeat,
            body: None,
        }],
    }
}

#[test]
fn all_instances_complete_their_iterations() {
    let server = RecordingServer::start();
    let config = workload(server.base_url(), 2, 3);

    let outcome = WorkloadRunner::new(config).run().unwrap();

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.totals.successes, 6);
    assert_eq!(server.request_count(), 6);
}

#[test]
fn every_instance_fails_independently_against_a_dead_target() {
    let config = workload(refused_endpoint(), 3, 5);

    let outcome = WorkloadRunner::new(config).run().unwrap();

    // Each instance aborts on its first iteration; aggregate counts for
    // those iterations are still reported.
    assert_eq!(outcome.failures.len(), 3);
    assert_eq!(outcome.totals.failures, 3);
    assert_eq!(outcome.totals.successes, 0);
}
