//! End-to-end run scenarios driven on paused tokio time.

use daqsim_engine::{DaqConfig, DaqRunner, RunError, RunOutcome};
use daqsim_messages::Event;
use daqsim_test_helpers::{
    phases, single_segment, FailingRegistry, FailingSink, FixedRegistry, RecordingSink,
};
use daqsim_types::{Adler32, RunId};
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

fn stf_events(sink: &RecordingSink) -> Vec<Event> {
    sink.events_where(|e| matches!(e, Event::StfGen { .. }))
}

#[tokio::test(start_paused = true)]
async fn deterministic_run_generates_expected_count() {
    let sink = Arc::new(RecordingSink::new());
    let registry = Arc::new(FixedRegistry::new(7));
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 10)).with_interarrival(2.0, 2.0);

    let runner = DaqRunner::new(config, registry.clone(), Some(sink.clone())).unwrap();
    let summary = runner.run(pending()).await.unwrap();

    assert_eq!(summary.run_id, RunId(7));
    assert_eq!(summary.stf_count, 5);
    assert_eq!(summary.outcome, RunOutcome::HorizonReached);
    assert!((summary.sim_time - 10.0).abs() < 0.1);

    // Lifecycle events bracket the STF stream.
    let events = sink.events();
    assert!(matches!(events.first(), Some(Event::RunImminent { .. })));
    assert!(matches!(events.get(1), Some(Event::StartRun { .. })));
    assert!(matches!(events.last(), Some(Event::EndRun { .. })));

    let stfs = stf_events(&sink);
    assert_eq!(stfs.len(), 5);
    for (i, event) in stfs.iter().enumerate() {
        match event {
            Event::StfGen {
                state,
                substate,
                filename,
                checksum,
                size,
                ..
            } => {
                assert_eq!(state, "RUN");
                assert_eq!(substate, "PHYSICS");
                assert_eq!(*filename, RunId(7).stf_filename(i as u64));
                // No persistence: sentinel checksum and size.
                assert_eq!(checksum, "ad:0");
                assert_eq!(*size, 0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    // Heartbeats at run start and run end.
    assert_eq!(registry.heartbeats(), 2);
}

#[tokio::test(start_paused = true)]
async fn state_transition_happens_exactly_once() {
    let sink = Arc::new(RecordingSink::new());
    let schedule = phases(&[("STANDBY", "NOT_READY", 5), ("RUN", "PHYSICS", 5)]);
    let config = DaqConfig::new(schedule).with_interarrival(2.0, 2.0);

    let runner = DaqRunner::new(config, Arc::new(FixedRegistry::new(1)), Some(sink.clone())).unwrap();
    let summary = runner.run(pending()).await.unwrap();
    assert_eq!(summary.stf_count, 5);

    let labels: Vec<String> = stf_events(&sink)
        .iter()
        .map(|e| match e {
            Event::StfGen { state, .. } => state.clone(),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();

    // Firings at 0, 2, 4 land in STANDBY; 6, 8 in RUN.
    assert_eq!(labels, ["STANDBY", "STANDBY", "STANDBY", "RUN", "RUN"]);
    let flips = labels.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(flips, 1, "state must change exactly once");
}

#[tokio::test(start_paused = true)]
async fn persisted_artifacts_match_their_events() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(RecordingSink::new());
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 3))
        .with_interarrival(1.0, 1.0)
        .with_destination(dir.path());

    let runner = DaqRunner::new(config, Arc::new(FixedRegistry::new(7)), Some(sink.clone())).unwrap();
    let summary = runner.run(pending()).await.unwrap();
    assert_eq!(summary.stf_count, 3);
    assert_eq!(summary.dataset, "run.000007.run");

    let folder = dir.path().join("run.000007.run");
    for event in stf_events(&sink) {
        match event {
            Event::StfGen {
                filename,
                checksum,
                size,
                ..
            } => {
                let body = std::fs::read(folder.join(&filename)).unwrap();
                assert_eq!(checksum, format!("ad:{}", Adler32::digest(&body)));
                assert_eq!(size, body.len() as u64);

                // The file body carries only the pre-checksum metadata.
                let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
                assert_eq!(value["filename"], filename);
                assert!(value.get("checksum").is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn unwritable_destination_aborts_before_running() {
    let dir = tempfile::tempdir().unwrap();
    // A plain file where the destination root should be.
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let sink = Arc::new(RecordingSink::new());
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 10)).with_destination(&blocker);

    let runner = DaqRunner::new(config, Arc::new(FixedRegistry::new(1)), Some(sink.clone())).unwrap();
    let result = runner.run(pending()).await;

    assert!(matches!(result, Err(RunError::CreateDir { .. })));
    // The run never reached Running: no start_run was announced.
    assert!(sink
        .events_where(|e| matches!(e, Event::StartRun { .. }))
        .is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_ends_the_run_with_one_end_event() {
    let sink = Arc::new(RecordingSink::new());
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 1000)).with_interarrival(1.0, 1.0);

    let runner = DaqRunner::new(config, Arc::new(FixedRegistry::new(1)), Some(sink.clone())).unwrap();
    let summary = runner
        .run(async {
            tokio::time::sleep(Duration::from_secs_f64(3.5)).await;
        })
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Interrupted);
    // Firings at 0, 1, 2, 3 happened before the cancellation at 3.5.
    assert_eq!(summary.stf_count, 4);
    assert!(summary.sim_time < 1000.0);

    let end_events = sink
        .events_where(|e| matches!(e, Event::EndRun { .. }))
        .len();
    assert_eq!(end_events, 1);
}

#[tokio::test(start_paused = true)]
async fn registry_failure_aborts_before_anything_happens() {
    let sink = Arc::new(RecordingSink::new());
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 10));

    let runner = DaqRunner::new(config, Arc::new(FailingRegistry), Some(sink.clone())).unwrap();
    let result = runner.run(pending()).await;

    assert!(matches!(result, Err(RunError::Registry(_))));
    assert!(sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transport_failures_do_not_stop_the_run() {
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 2)).with_interarrival(1.0, 1.0);

    let runner = DaqRunner::new(
        config,
        Arc::new(FixedRegistry::new(1)),
        Some(Arc::new(FailingSink)),
    )
    .unwrap();
    let summary = runner.run(pending()).await.unwrap();

    // Every send failed, but the STFs were still counted.
    assert_eq!(summary.stf_count, 2);
    assert_eq!(summary.outcome, RunOutcome::HorizonReached);
}

#[tokio::test(start_paused = true)]
async fn seeded_runs_are_reproducible() {
    let mut counts = Vec::new();
    for _ in 0..2 {
        let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 20))
            .with_interarrival(1.0, 2.0)
            .with_seed(42);
        let runner = DaqRunner::new(config, Arc::new(FixedRegistry::new(1)), None).unwrap();
        let summary = runner.run(pending()).await.unwrap();
        // With bounds [1, 2) over 20 seconds the count is boxed in.
        assert!((10..=20).contains(&summary.stf_count));
        counts.push(summary.stf_count);
    }
    assert_eq!(counts[0], counts[1]);
}

#[tokio::test(start_paused = true)]
async fn until_overrides_the_schedule_horizon() {
    let config = DaqConfig::new(single_segment("RUN", "PHYSICS", 1000))
        .with_interarrival(1.0, 1.0)
        .with_until(4.0);

    let runner = DaqRunner::new(config, Arc::new(FixedRegistry::new(1)), None).unwrap();
    let summary = runner.run(pending()).await.unwrap();

    assert_eq!(summary.stf_count, 4);
    assert!((summary.sim_time - 4.0).abs() < 0.1);
}
