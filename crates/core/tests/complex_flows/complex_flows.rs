//! Complex flow tests for the core crate.
//! These tests hammer the tracker from many tasks at once and check that no
//! update is lost or applied out of order.

use std::sync::Arc;

use bondcredit_core::types::MetricsSnapshot;
use bondcredit_core::{OpportunityDescriptor, OpportunityScoreTracker};
use proptest::prelude::*;

fn metrics_for(step: usize) -> MetricsSnapshot {
    MetricsSnapshot {
        apy_30d: Some((step % 20) as f64),
        success_rate_pct: 50.0 + (step % 50) as f64,
        avg_gas_used: 10.0 + (step % 90) as f64,
        avg_latency_ms: 500.0 + (step * 37 % 9000) as f64,
        is_audited: step % 3 != 0,
        has_incidents: step % 7 == 0,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_to_same_id_keep_every_snapshot() {
    let tracker = Arc::new(OpportunityScoreTracker::default());
    let opportunity = OpportunityDescriptor::new("shared", "Shared Vault", "shared.near", "vault");

    let mut handles = Vec::new();
    for worker in 0..8 {
        let tracker = Arc::clone(&tracker);
        let opportunity = opportunity.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                tracker
                    .update_opportunity(&opportunity, &metrics_for(worker * 25 + i))
                    .unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let record = tracker.get("shared").unwrap();
    assert_eq!(record.history.len(), 200);
    assert_eq!(record.update_count, 200);
    assert_eq!(record.current_score, record.history[199].score);
    assert_eq!(record.updated_at, record.history[199].recorded_at);
    assert!(record
        .history
        .iter()
        .zip(record.history.iter().skip(1))
        .all(|(a, b)| a.recorded_at <= b.recorded_at));

    // The event log follows the same order as the history.
    let events = tracker.recent_events(200);
    assert_eq!(events.len(), 200);
    assert_eq!(events[0].new_total, record.total());
    assert!(events
        .iter()
        .rev()
        .zip(record.history.iter())
        .all(|(event, snapshot)| event.new_total == snapshot.score.total()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_updates_to_different_ids_are_independent() {
    let tracker = Arc::new(OpportunityScoreTracker::default());

    let mut handles = Vec::new();
    for worker in 0..16 {
        let tracker = Arc::clone(&tracker);
        handles.push(tokio::spawn(async move {
            let opportunity = OpportunityDescriptor::new(
                format!("opp-{worker:02}"),
                format!("Vault {worker}"),
                format!("vault-{worker}.near"),
                "vault",
            );
            for i in 0..(worker + 1) {
                tracker.update_opportunity(&opportunity, &metrics_for(i)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(tracker.len(), 16);
    for worker in 0..16 {
        let record = tracker.get(&format!("opp-{worker:02}")).unwrap();
        assert_eq!(record.history.len(), worker + 1);
        assert_eq!(record.name, format!("Vault {worker}"));
    }
}

proptest! {
    #[test]
    fn prop_history_tracks_every_sequential_update(steps in proptest::collection::vec(0usize..500, 1..40)) {
        let tracker = OpportunityScoreTracker::default();
        let opportunity = OpportunityDescriptor::new("p", "Prop Vault", "p.near", "vault");

        for step in &steps {
            tracker.update_opportunity(&opportunity, &metrics_for(*step)).unwrap();
        }

        let record = tracker.get("p").unwrap();
        prop_assert_eq!(record.history.len(), steps.len());
        prop_assert_eq!(record.current_score, record.history[steps.len() - 1].score);
    }
}
