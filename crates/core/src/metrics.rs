//! Metrics sources feeding the tracker.

use bondcredit_types::MetricsSnapshot;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{OpportunityDescriptor, Result, TrackerError};

/// Source of fresh metrics for an opportunity
///
/// Implementations may read live indexer data or simulate it; the tracker
/// only needs a resolved snapshot.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsProvider: Send + Sync {
    fn metrics_for(&self, opportunity: &OpportunityDescriptor) -> Result<MetricsSnapshot>;
}

/// Simulated metrics drawn from a seeded generator
///
/// Used by the dashboard's demo mode and by tests that need plausible
/// traffic without an indexer.
#[derive(Debug)]
pub struct SimulatedMetrics {
    rng: Mutex<StdRng>,
    audit_probability: f64,
    incident_probability: f64,
}

impl SimulatedMetrics {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            audit_probability: 0.8,
            incident_probability: 0.1,
        }
    }

    /// Override the audit and incident rates, each in `[0, 1]`
    pub fn with_probabilities(mut self, audit: f64, incident: f64) -> Result<Self> {
        for (name, p) in [("audit", audit), ("incident", incident)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TrackerError::InvalidConfig(format!(
                    "{name} probability must be between 0.0 and 1.0, got {p}"
                )));
            }
        }
        self.audit_probability = audit;
        self.incident_probability = incident;
        Ok(self)
    }

    /// Draw one snapshot
    pub fn sample(&self) -> MetricsSnapshot {
        let mut rng = self.rng.lock();
        let now = Utc::now();

        let apy_30d = round2(rng.gen_range(2.0..22.0));
        let apy_7d = round2((apy_30d + rng.gen_range(-1.5..1.5)).max(0.0));
        let is_audited = rng.gen_bool(self.audit_probability);
        let has_incidents = rng.gen_bool(self.incident_probability);

        MetricsSnapshot {
            apy_7d: Some(apy_7d),
            apy_30d: Some(apy_30d),
            target_apy: round2(apy_30d * 1.1),
            success_rate_pct: round2(rng.gen_range(80.0..100.0)),
            avg_gas_used: round2(rng.gen_range(8.0..120.0)),
            avg_latency_ms: rng.gen_range(400.0..12_000.0_f64).round(),
            total_intents: rng.gen_range(25..5_000),
            is_audited,
            has_incidents,
            audit_date: is_audited.then(|| now - Duration::days(rng.gen_range(7..540))),
            last_incident_date: has_incidents.then(|| now - Duration::days(rng.gen_range(1..365))),
        }
    }
}

impl MetricsProvider for SimulatedMetrics {
    fn metrics_for(&self, opportunity: &OpportunityDescriptor) -> Result<MetricsSnapshot> {
        let metrics = self.sample();
        tracing::debug!(
            opportunity_id = %opportunity.id,
            apy_30d = ?metrics.apy_30d,
            success_rate_pct = metrics.success_rate_pct,
            "simulated metrics"
        );
        Ok(metrics)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
