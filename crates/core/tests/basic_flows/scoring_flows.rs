//! Scoring flows exercised through the core crate's re-exports.

use bondcredit_core::trust::{ScoringConfig, ScoringEngine};
use bondcredit_core::types::{
    ActivityMetrics, AgentSubScores, CredibilityTier, MetricsSnapshot, QualitySignals,
    RewardTier, RiskLevel,
};

fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default()).unwrap()
}

#[test]
fn test_reference_opportunity_is_preferred() {
    let metrics: MetricsSnapshot = serde_json::from_value(serde_json::json!({
        "apy30d": 12.2,
        "successRatePct": 95.5,
        "avgGasUsed": 45,
        "avgLatencyMs": 1800,
        "isAudited": true,
        "hasIncidents": false
    }))
    .unwrap();

    let score = engine().opportunity().score(&metrics);
    assert_eq!(score.breakdown.performance, 30);
    assert_eq!(score.breakdown.reliability, 33);
    assert_eq!(score.breakdown.safety, 18);
    assert_eq!(score.total(), 81);
    assert_eq!(score.risk_level, RiskLevel::Preferred);
}

#[test]
fn test_empty_payload_scores_zero() {
    let metrics: MetricsSnapshot = serde_json::from_str("{}").unwrap();
    let score = engine().opportunity().score(&metrics);
    assert_eq!(score.total(), 0);
    assert_eq!(score.risk_level, RiskLevel::Caution);
}

#[test]
fn test_seven_day_apy_only_fills_a_missing_thirty_day_figure() {
    let missing: MetricsSnapshot =
        serde_json::from_value(serde_json::json!({ "apy7d": 20.0 })).unwrap();
    let reported_zero: MetricsSnapshot =
        serde_json::from_value(serde_json::json!({ "apy7d": 20.0, "apy30d": 0.0 })).unwrap();

    let engine = engine();
    assert_eq!(engine.opportunity().score(&missing).breakdown.performance, 40);
    assert_eq!(engine.opportunity().score(&reported_zero).breakdown.performance, 0);
}

#[test]
fn test_incident_drops_opportunity_a_band() {
    // 20 + 33 + 18 = 71, then 20 + 33 + 13 = 66
    let healthy = MetricsSnapshot {
        apy_30d: Some(7.5),
        success_rate_pct: 95.5,
        avg_gas_used: 45.0,
        avg_latency_ms: 1800.0,
        is_audited: true,
        ..Default::default()
    };
    let breached = MetricsSnapshot {
        has_incidents: true,
        ..healthy.clone()
    };

    let engine = engine();
    assert_eq!(engine.opportunity().score(&healthy).total(), 71);
    assert_eq!(engine.opportunity().score(&breached).total(), 66);
    assert_eq!(engine.opportunity().score(&breached).risk_level, RiskLevel::Moderate);
}

#[test]
fn test_agent_credibility_flow() {
    let credibility = engine().credibility().assess(
        &AgentSubScores {
            provenance: 92.0,
            performance: 78.0,
            perception: 64.0,
            verification: 88.0,
        },
        &QualitySignals {
            data_completeness: 90.0,
            scoring_consistency: 80.0,
            verified_methods: 100.0,
            historical_stability: 70.0,
        },
    );

    // 32.2 + 23.4 + 12.8 + 13.2 = 81.6
    assert_eq!(credibility.score.overall, 82);
    // 27 + 20 + 25 + 14 = 86
    assert_eq!(credibility.score.confidence, 86);
    assert_eq!(credibility.tier, CredibilityTier::Platinum);
    assert_eq!(credibility.display_tier, CredibilityTier::Gold);
}

#[test]
fn test_rewards_flow() {
    let engine = engine();
    let estimate = engine.rewards().estimate(&ActivityMetrics {
        transaction_volume_usd: 7_500.0,
        smart_contract_calls: 320,
        unique_wallets: 40,
    });

    // 6 + 6 + 2
    assert_eq!(estimate.points, 14);
    assert_eq!(estimate.tier, RewardTier::Gold);
    assert_eq!(estimate.reward_usd, 6_000);
    assert_eq!(
        engine.rewards().points_to_next_tier(estimate.points),
        Some((RewardTier::Diamond, 3))
    );

    let json = serde_json::to_value(estimate).unwrap();
    assert_eq!(json["rewardUSD"], 6_000);
    assert_eq!(json["tier"], "gold");
}
