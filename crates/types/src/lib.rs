//! Shared types for the Bond Credit scoring engine
//!
//! Inputs are plain records whose numeric fields default to zero and whose
//! flags default to `false`, so partially populated payloads from the
//! dashboard deserialize without faults. Outputs are plain values with no
//! hidden handles, ready to be serialized into a response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the performance component of an opportunity score
pub const MAX_PERFORMANCE: u32 = 40;
/// Upper bound of the reliability component of an opportunity score
pub const MAX_RELIABILITY: u32 = 40;
/// Upper bound of the safety component of an opportunity score
pub const MAX_SAFETY: u32 = 20;
/// Upper bound of a composite opportunity score
pub const MAX_TOTAL: u32 = 100;

// Opportunity metrics and scores

/// Raw operational metrics for a yield opportunity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsSnapshot {
    /// Trailing 7-day APY, in percent
    pub apy_7d: Option<f64>,
    /// Trailing 30-day APY, in percent; `None` when not yet reported
    pub apy_30d: Option<f64>,
    /// Advertised target APY, in percent
    pub target_apy: f64,
    /// Share of intents that settled successfully, in percent
    pub success_rate_pct: f64,
    /// Average gas per intent, in TGas
    pub avg_gas_used: f64,
    /// Average end-to-end latency, in milliseconds
    pub avg_latency_ms: f64,
    /// Number of intents observed
    pub total_intents: u64,
    /// Whether the underlying contracts have been audited
    pub is_audited: bool,
    /// Whether a security incident has been recorded
    pub has_incidents: bool,
    /// Date of the most recent audit
    pub audit_date: Option<DateTime<Utc>>,
    /// Date of the most recent incident
    pub last_incident_date: Option<DateTime<Utc>>,
}

/// Score components of an opportunity
///
/// `total` is always `performance + reliability + safety` and every
/// component stays within its cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub performance: u32,
    pub reliability: u32,
    pub safety: u32,
    pub total: u32,
}

impl ScoreBreakdown {
    /// Build a breakdown, clamping each component to its cap
    pub fn new(performance: u32, reliability: u32, safety: u32) -> Self {
        let performance = performance.min(MAX_PERFORMANCE);
        let reliability = reliability.min(MAX_RELIABILITY);
        let safety = safety.min(MAX_SAFETY);
        Self {
            performance,
            reliability,
            safety,
            total: (performance + reliability + safety).min(MAX_TOTAL),
        }
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/100 (performance {}, reliability {}, safety {})",
            self.total, self.performance, self.reliability, self.safety
        )
    }
}

/// Risk label derived from a composite opportunity score
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Total below 50
    #[default]
    Caution,
    /// Total in `[50, 80)`
    Moderate,
    /// Total of 80 or more
    Preferred,
}

impl RiskLevel {
    /// Badge shown next to the score in the opportunity list
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Caution => "⚠️",
            Self::Moderate => "🛡️",
            Self::Preferred => "⭐",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caution => write!(f, "Caution"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Preferred => write!(f, "Preferred"),
        }
    }
}

/// A breakdown together with the risk label it maps to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityScore {
    pub breakdown: ScoreBreakdown,
    pub risk_level: RiskLevel,
}

impl OpportunityScore {
    pub fn total(&self) -> u32 {
        self.breakdown.total
    }
}

impl fmt::Display for OpportunityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}]",
            self.risk_level.badge(),
            self.breakdown,
            self.risk_level
        )
    }
}

// Agent credibility

/// Sub-scores of an agent, each in `[0, 100]`
///
/// Each value is produced by a caller-side method (audit recency, source
/// verification, risk-adjusted return and so on).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSubScores {
    pub provenance: f64,
    pub performance: f64,
    pub perception: f64,
    pub verification: f64,
}

/// Data-quality signals behind an agent score, each in `[0, 100]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualitySignals {
    /// How much of the expected input data was present
    pub data_completeness: f64,
    /// Agreement of scores computed at different times
    pub scoring_consistency: f64,
    /// Fraction of scoring methods that were verified
    pub verified_methods: f64,
    /// Stability of historical scores
    pub historical_stability: f64,
}

/// Computed credibility score of an agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentScore {
    pub provenance: u32,
    pub performance: u32,
    pub perception: u32,
    pub verification: u32,
    pub overall: u32,
    pub confidence: u32,
}

/// Credibility tier of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredibilityTier {
    /// Below every display band
    Unrated,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for CredibilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrated => write!(f, "Unrated"),
            Self::Bronze => write!(f, "Bronze"),
            Self::Silver => write!(f, "Silver"),
            Self::Gold => write!(f, "Gold"),
            Self::Platinum => write!(f, "Platinum"),
        }
    }
}

/// Agent score with the tiers derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCredibility {
    pub score: AgentScore,
    /// Tier assigned when the agent profile is created
    pub tier: CredibilityTier,
    /// Tier used to colour the score on the credibility page
    pub display_tier: CredibilityTier,
}

// Protocol rewards

/// On-chain activity of a protocol over a rewards epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityMetrics {
    #[serde(alias = "transactionVolumeUSD")]
    pub transaction_volume_usd: f64,
    pub smart_contract_calls: u64,
    pub unique_wallets: u64,
}

/// Rewards tier, ordered from `NoTier` up to `Diamond`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    #[default]
    NoTier,
    Explorer,
    Contributor,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl RewardTier {
    /// All tiers from lowest to highest
    pub const ALL: [RewardTier; 7] = [
        Self::NoTier,
        Self::Explorer,
        Self::Contributor,
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Diamond,
    ];

    /// The tier directly above this one, if any
    pub fn next_tier(&self) -> Option<RewardTier> {
        let idx = Self::ALL.iter().position(|tier| tier == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for RewardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTier => write!(f, "No Tier"),
            Self::Explorer => write!(f, "Explorer"),
            Self::Contributor => write!(f, "Contributor"),
            Self::Bronze => write!(f, "Bronze"),
            Self::Silver => write!(f, "Silver"),
            Self::Gold => write!(f, "Gold"),
            Self::Diamond => write!(f, "Diamond"),
        }
    }
}

/// Points earned by each activity metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoints {
    pub volume: u32,
    pub contract_calls: u32,
    pub unique_wallets: u32,
}

impl ActivityPoints {
    pub fn total(&self) -> u32 {
        self.volume + self.contract_calls + self.unique_wallets
    }
}

/// Rewards estimate for a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEstimate {
    pub points: u32,
    pub tier: RewardTier,
    #[serde(rename = "rewardUSD")]
    pub reward_usd: u64,
    pub breakdown: ActivityPoints,
}

impl fmt::Display for RewardEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points, {} tier, ${} reward",
            self.points, self.tier, self.reward_usd
        )
    }
}
