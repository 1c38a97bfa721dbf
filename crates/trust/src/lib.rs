//! Scoring engine for the Bond Credit dashboard
//!
//! This crate turns raw operational and reputational metrics into bounded
//! scores and ordinal tiers:
//! - Bucket tables mapping continuous metrics onto points
//! - Opportunity trust scores and risk levels
//! - Agent credibility scores, confidence and tiers
//! - Protocol rewards tiers and payouts
//!
//! Every calculator is a pure function of its input and its configuration,
//! so a single instance can be shared freely across threads.

mod bucket;
mod credibility;
mod error;
mod opportunity;
mod rewards;

pub use bucket::{BucketTable, Direction, LinearScale};
pub use credibility::{
    ConfidenceWeights, CredibilityCalculator, CredibilityConfig, CredibilityWeights,
    ASSIGNMENT_FLOOR, ASSIGNMENT_TIERS, DEFAULT_CONFIDENCE_WEIGHTS, DEFAULT_CREDIBILITY_WEIGHTS,
    DISPLAY_FLOOR, DISPLAY_TIERS,
};
pub use error::ScoringError;
pub use opportunity::{
    OpportunityConfig, OpportunityScorer, RecentAuditRule, SafetyPolicy, APY_BANDS, GAS_BUCKETS,
    LATENCY_BUCKETS, RISK_LEVEL_BANDS, SUCCESS_RATE_POINTS,
};
pub use rewards::{
    RewardsCalculator, RewardsConfig, CONTRACT_CALL_POINTS, MAX_REWARD_POINTS, REWARD_PAYOUTS,
    REWARD_TIERS, UNIQUE_WALLET_POINTS, VOLUME_POINTS,
};

/// Result type for scoring configuration
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Allowed distance between a weight table's sum and 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Every table and weight used by the engine
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub opportunity: OpportunityConfig,
    pub credibility: CredibilityConfig,
    pub rewards: RewardsConfig,
}

impl ScoringConfig {
    /// Parse a configuration from JSON; omitted sections keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.opportunity.validate()?;
        self.credibility.validate()?;
        self.rewards.validate()?;
        Ok(())
    }
}

/// The three calculators built from one configuration
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    opportunity: OpportunityScorer,
    credibility: CredibilityCalculator,
    rewards: RewardsCalculator,
}

impl ScoringEngine {
    /// Build an engine, rejecting configurations that fail validation
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        let ScoringConfig {
            opportunity,
            credibility,
            rewards,
        } = config;

        Ok(Self {
            opportunity: OpportunityScorer::new(opportunity),
            credibility: CredibilityCalculator::new(credibility),
            rewards: RewardsCalculator::new(rewards),
        })
    }

    pub fn opportunity(&self) -> &OpportunityScorer {
        &self.opportunity
    }

    pub fn credibility(&self) -> &CredibilityCalculator {
        &self.credibility
    }

    pub fn rewards(&self) -> &RewardsCalculator {
        &self.rewards
    }
}
