//! Tracker flows: record lifecycle, history growth and metrics providers.

use bondcredit_core::types::{MetricsSnapshot, RiskLevel};
use bondcredit_core::{
    OpportunityDescriptor, OpportunityScoreTracker, SimulatedMetrics, TrackerConfig,
};

fn lending() -> OpportunityDescriptor {
    OpportunityDescriptor::new("opp-lend", "USDC Lending", "lend.bondcredit.near", "lending")
}

#[test]
fn test_history_grows_with_each_update() {
    let tracker = OpportunityScoreTracker::default();
    let opportunity = lending();

    for n in 1..=12 {
        let metrics = MetricsSnapshot {
            apy_30d: Some(n as f64 * 1.5),
            success_rate_pct: 90.0,
            ..Default::default()
        };
        let record = tracker.update_opportunity(&opportunity, &metrics).unwrap();
        assert_eq!(record.history.len(), n);
        assert_eq!(record.current_score, record.history[n - 1].score);
    }

    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.history("opp-lend").map(|h| h.len()), Some(12));
}

#[test]
fn test_unknown_id_is_not_found() {
    let tracker = OpportunityScoreTracker::default();
    assert!(tracker.get("missing").is_none());
    assert!(tracker.history("missing").is_none());
    assert!(!tracker.contains("missing"));
}

#[test]
fn test_returned_record_is_detached() {
    let tracker = OpportunityScoreTracker::default();
    let mut record = tracker
        .update_opportunity(&lending(), &MetricsSnapshot::default())
        .unwrap();
    record.history.clear();
    record.name = "tampered".into();

    let stored = tracker.get("opp-lend").unwrap();
    assert_eq!(stored.history.len(), 1);
    assert_eq!(stored.name, "USDC Lending");
}

#[test]
fn test_record_serializes_for_the_dashboard() {
    let tracker = OpportunityScoreTracker::default();
    let record = tracker
        .update_opportunity(
            &lending(),
            &MetricsSnapshot {
                apy_30d: Some(16.0),
                success_rate_pct: 99.0,
                avg_gas_used: 12.0,
                avg_latency_ms: 600.0,
                is_audited: true,
                ..Default::default()
            },
        )
        .unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["opportunity_id"], "opp-lend");
    assert_eq!(json["current_score"]["breakdown"]["total"], 97);
    assert_eq!(json["current_score"]["risk_level"], "preferred");
    assert_eq!(json["history"].as_array().map(|h| h.len()), Some(1));
}

#[test]
fn test_simulated_refresh_keeps_invariants() {
    let tracker = OpportunityScoreTracker::new(TrackerConfig {
        max_history: 10,
        ..Default::default()
    })
    .unwrap();
    let source = SimulatedMetrics::new(2024);
    let opportunities = [
        lending(),
        OpportunityDescriptor::new("opp-stake", "NEAR Staking", "stake.bondcredit.near", "staking"),
        OpportunityDescriptor::new("opp-lp", "LP Vault", "lp.bondcredit.near", "liquidity"),
    ];

    for _ in 0..25 {
        for opportunity in &opportunities {
            let record = tracker.refresh(opportunity, &source).unwrap();
            let b = record.current_score.breakdown;
            assert!(b.performance <= 40 && b.reliability <= 40 && b.safety <= 20);
            assert_eq!(b.total, b.performance + b.reliability + b.safety);
        }
    }

    for opportunity in &opportunities {
        let record = tracker.get(&opportunity.id).unwrap();
        assert_eq!(record.history.len(), 10);
        assert_eq!(record.update_count, 25);
    }

    let by_risk: usize = [RiskLevel::Caution, RiskLevel::Moderate, RiskLevel::Preferred]
        .into_iter()
        .map(|level| tracker.opportunities_by_risk(level).len())
        .sum();
    assert_eq!(by_risk, 3);
    assert_eq!(tracker.recent_events(5).len(), 5);
}
