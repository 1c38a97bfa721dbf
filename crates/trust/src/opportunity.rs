use bondcredit_types::{
    MetricsSnapshot, OpportunityScore, RiskLevel, ScoreBreakdown, MAX_PERFORMANCE,
    MAX_RELIABILITY, MAX_SAFETY,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bucket::{BucketTable, LinearScale};

/// APY bands in percent. A band's points are awarded once its lower bound
/// is reached; any positive APY earns the first band.
pub const APY_BANDS: &[(f64, u32)] = &[
    (15.0, 40),
    (10.0, 30),
    (5.0, 20),
    (f64::MIN_POSITIVE, 10),
];

/// Average gas per intent in TGas, exclusive upper bounds
pub const GAS_BUCKETS: &[(f64, u32)] = &[
    (20.0, 10),
    (40.0, 8),
    (60.0, 6),
    (80.0, 4),
    (100.0, 2),
];

/// Average latency in milliseconds, exclusive upper bounds
pub const LATENCY_BUCKETS: &[(f64, u32)] = &[
    (1000.0, 5),
    (2500.0, 4),
    (5000.0, 3),
    (7500.0, 2),
    (10000.0, 1),
];

/// Composite score to risk label, inclusive lower bounds
pub const RISK_LEVEL_BANDS: &[(f64, RiskLevel)] =
    &[(80.0, RiskLevel::Preferred), (50.0, RiskLevel::Moderate)];

/// Points available from the success rate
pub const SUCCESS_RATE_POINTS: u32 = 25;

/// When an audited opportunity earns the recent-audit bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecentAuditRule {
    /// Every audited opportunity earns the bonus, regardless of `audit_date`
    Unconditional,
    /// Only audits dated within the given number of days earn the bonus
    WithinDays(u32),
}

/// Safety sub-score policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyPolicy {
    pub audited_base: u32,
    pub recent_audit_bonus: u32,
    pub recent_audit_rule: RecentAuditRule,
    pub incident_penalty: u32,
    pub max_points: u32,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            audited_base: 15,
            recent_audit_bonus: 3,
            // The recency check has never been tied to the audit date and
            // published tiers already depend on the bonus.
            recent_audit_rule: RecentAuditRule::Unconditional,
            incident_penalty: 5,
            max_points: MAX_SAFETY,
        }
    }
}

impl SafetyPolicy {
    /// Safety points for a snapshot, evaluated as of `as_of`
    pub fn points(&self, metrics: &MetricsSnapshot, as_of: DateTime<Utc>) -> u32 {
        let mut points: i64 = 0;

        if metrics.is_audited {
            points += self.audited_base as i64;
            if self.audit_is_recent(metrics.audit_date, as_of) {
                points += self.recent_audit_bonus as i64;
            }
        }
        if metrics.has_incidents {
            points -= self.incident_penalty as i64;
        }

        points.clamp(0, self.max_points as i64) as u32
    }

    fn audit_is_recent(&self, audit_date: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> bool {
        match self.recent_audit_rule {
            RecentAuditRule::Unconditional => true,
            RecentAuditRule::WithinDays(days) => audit_date
                .map(|date| date <= as_of && as_of - date <= Duration::days(days as i64))
                .unwrap_or(false),
        }
    }
}

/// Tables and caps used to score opportunities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityConfig {
    pub apy_bands: BucketTable<u32>,
    pub success_rate: LinearScale,
    pub gas_points: BucketTable<u32>,
    pub latency_points: BucketTable<u32>,
    pub performance_cap: u32,
    pub reliability_cap: u32,
    pub safety: SafetyPolicy,
    pub risk_levels: BucketTable<RiskLevel>,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            apy_bands: BucketTable::higher_is_better(APY_BANDS, 0),
            success_rate: LinearScale {
                max_input: 100.0,
                max_points: SUCCESS_RATE_POINTS,
            },
            gas_points: BucketTable::lower_is_better(GAS_BUCKETS, 0),
            latency_points: BucketTable::lower_is_better(LATENCY_BUCKETS, 0),
            performance_cap: MAX_PERFORMANCE,
            reliability_cap: MAX_RELIABILITY,
            safety: SafetyPolicy::default(),
            risk_levels: BucketTable::higher_is_better(RISK_LEVEL_BANDS, RiskLevel::Caution),
        }
    }
}

impl OpportunityConfig {
    pub fn validate(&self) -> crate::Result<()> {
        self.apy_bands.validate("apy_bands")?;
        self.gas_points.validate("gas_points")?;
        self.latency_points.validate("latency_points")?;
        self.risk_levels.validate("risk_levels")?;

        if self.performance_cap > MAX_PERFORMANCE
            || self.reliability_cap > MAX_RELIABILITY
            || self.safety.max_points > MAX_SAFETY
        {
            return Err(crate::ScoringError::ConfigError(format!(
                "component caps must not exceed {MAX_PERFORMANCE}/{MAX_RELIABILITY}/{MAX_SAFETY}"
            )));
        }
        Ok(())
    }
}

/// Scores yield opportunities from their operational metrics
#[derive(Debug, Clone, Default)]
pub struct OpportunityScorer {
    config: OpportunityConfig,
}

impl OpportunityScorer {
    pub fn new(config: OpportunityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OpportunityConfig {
        &self.config
    }

    /// Score a snapshot as of now
    pub fn score(&self, metrics: &MetricsSnapshot) -> OpportunityScore {
        self.score_at(metrics, Utc::now())
    }

    /// Score a snapshot, evaluating date-dependent rules as of `as_of`
    pub fn score_at(&self, metrics: &MetricsSnapshot, as_of: DateTime<Utc>) -> OpportunityScore {
        let breakdown = ScoreBreakdown::new(
            self.performance_points(metrics),
            self.reliability_points(metrics),
            self.config.safety.points(metrics, as_of),
        );
        let risk_level = self.risk_level(breakdown.total);

        tracing::debug!(
            performance = breakdown.performance,
            reliability = breakdown.reliability,
            safety = breakdown.safety,
            total = breakdown.total,
            %risk_level,
            "scored opportunity metrics"
        );

        OpportunityScore {
            breakdown,
            risk_level,
        }
    }

    /// Performance points from the 30-day APY, falling back to the 7-day APY
    /// only when no 30-day figure was reported
    pub fn performance_points(&self, metrics: &MetricsSnapshot) -> u32 {
        let apy = effective_apy(metrics);
        self.config
            .apy_bands
            .lookup(apy)
            .min(self.config.performance_cap)
    }

    /// Reliability points: success rate, gas and latency, capped
    pub fn reliability_points(&self, metrics: &MetricsSnapshot) -> u32 {
        let success = self.config.success_rate.points(metrics.success_rate_pct);
        let gas = self.config.gas_points.lookup(metrics.avg_gas_used);
        let latency = self.config.latency_points.lookup(metrics.avg_latency_ms);
        (success + gas + latency).min(self.config.reliability_cap)
    }

    pub fn risk_level(&self, total: u32) -> RiskLevel {
        self.config.risk_levels.lookup(total as f64)
    }
}

fn effective_apy(metrics: &MetricsSnapshot) -> f64 {
    metrics.apy_30d.or(metrics.apy_7d).unwrap_or(0.0)
}
