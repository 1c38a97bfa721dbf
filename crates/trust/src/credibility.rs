use bondcredit_types::{
    AgentCredibility, AgentScore, AgentSubScores, CredibilityTier, QualitySignals,
};
use serde::{Deserialize, Serialize};

use crate::bucket::BucketTable;

/// Tier assigned when an agent profile is created
pub const ASSIGNMENT_TIERS: &[(f64, CredibilityTier)] = &[
    (80.0, CredibilityTier::Platinum),
    (60.0, CredibilityTier::Gold),
];

/// Floor of the assignment table
pub const ASSIGNMENT_FLOOR: CredibilityTier = CredibilityTier::Silver;

/// Bands used to colour scores on the credibility page
pub const DISPLAY_TIERS: &[(f64, CredibilityTier)] = &[
    (90.0, CredibilityTier::Platinum),
    (80.0, CredibilityTier::Gold),
    (70.0, CredibilityTier::Silver),
    (60.0, CredibilityTier::Bronze),
];

/// Floor of the display table
pub const DISPLAY_FLOOR: CredibilityTier = CredibilityTier::Unrated;

/// Weights of the four credibility sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredibilityWeights {
    pub provenance: f64,
    pub performance: f64,
    pub perception: f64,
    pub verification: f64,
}

pub const DEFAULT_CREDIBILITY_WEIGHTS: CredibilityWeights = CredibilityWeights {
    provenance: 0.35,
    performance: 0.30,
    perception: 0.20,
    verification: 0.15,
};

impl Default for CredibilityWeights {
    fn default() -> Self {
        DEFAULT_CREDIBILITY_WEIGHTS
    }
}

impl CredibilityWeights {
    fn sum(&self) -> f64 {
        self.provenance + self.performance + self.perception + self.verification
    }

    fn apply(&self, scores: &AgentSubScores) -> f64 {
        self.provenance * unit_score(scores.provenance)
            + self.performance * unit_score(scores.performance)
            + self.perception * unit_score(scores.perception)
            + self.verification * unit_score(scores.verification)
    }
}

/// Weights of the data-quality signals behind the confidence estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub data_completeness: f64,
    pub scoring_consistency: f64,
    pub verified_methods: f64,
    pub historical_stability: f64,
}

pub const DEFAULT_CONFIDENCE_WEIGHTS: ConfidenceWeights = ConfidenceWeights {
    data_completeness: 0.30,
    scoring_consistency: 0.25,
    verified_methods: 0.25,
    historical_stability: 0.20,
};

impl Default for ConfidenceWeights {
    fn default() -> Self {
        DEFAULT_CONFIDENCE_WEIGHTS
    }
}

impl ConfidenceWeights {
    fn sum(&self) -> f64 {
        self.data_completeness
            + self.scoring_consistency
            + self.verified_methods
            + self.historical_stability
    }

    fn apply(&self, signals: &QualitySignals) -> f64 {
        self.data_completeness * unit_score(signals.data_completeness)
            + self.scoring_consistency * unit_score(signals.scoring_consistency)
            + self.verified_methods * unit_score(signals.verified_methods)
            + self.historical_stability * unit_score(signals.historical_stability)
    }
}

/// Weights and tier tables for agent credibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityConfig {
    pub weights: CredibilityWeights,
    pub confidence_weights: ConfidenceWeights,
    pub assignment_tiers: BucketTable<CredibilityTier>,
    pub display_tiers: BucketTable<CredibilityTier>,
}

impl Default for CredibilityConfig {
    fn default() -> Self {
        Self {
            weights: CredibilityWeights::default(),
            confidence_weights: ConfidenceWeights::default(),
            assignment_tiers: BucketTable::higher_is_better(ASSIGNMENT_TIERS, ASSIGNMENT_FLOOR),
            display_tiers: BucketTable::higher_is_better(DISPLAY_TIERS, DISPLAY_FLOOR),
        }
    }
}

impl CredibilityConfig {
    pub fn validate(&self) -> crate::Result<()> {
        check_weight_sum("credibility weights", self.weights.sum())?;
        check_weight_sum("confidence weights", self.confidence_weights.sum())?;
        self.assignment_tiers.validate("assignment_tiers")?;
        self.display_tiers.validate("display_tiers")?;
        Ok(())
    }
}

fn check_weight_sum(name: &str, sum: f64) -> crate::Result<()> {
    if (sum - 1.0).abs() > crate::WEIGHT_TOLERANCE {
        return Err(crate::ScoringError::InvalidWeights(format!(
            "{name} sum to {sum}, expected 1.0"
        )));
    }
    Ok(())
}

/// Combines agent sub-scores into an overall score, confidence and tiers
#[derive(Debug, Clone, Default)]
pub struct CredibilityCalculator {
    config: CredibilityConfig,
}

impl CredibilityCalculator {
    pub fn new(config: CredibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CredibilityConfig {
        &self.config
    }

    /// Score an agent and derive both of its tiers
    pub fn assess(&self, scores: &AgentSubScores, signals: &QualitySignals) -> AgentCredibility {
        let score = AgentScore {
            provenance: rounded(scores.provenance),
            performance: rounded(scores.performance),
            perception: rounded(scores.perception),
            verification: rounded(scores.verification),
            overall: self.overall(scores),
            confidence: self.confidence(signals),
        };

        let credibility = AgentCredibility {
            score,
            tier: self.assignment_tier(score.overall),
            display_tier: self.display_tier(score.overall),
        };

        tracing::debug!(
            overall = score.overall,
            confidence = score.confidence,
            tier = %credibility.tier,
            display_tier = %credibility.display_tier,
            "assessed agent credibility"
        );

        credibility
    }

    /// `round(Σ weight × sub-score)`, clamped to `[0, 100]`
    pub fn overall(&self, scores: &AgentSubScores) -> u32 {
        rounded(self.config.weights.apply(scores))
    }

    /// Weighted estimate over the data-quality signals, clamped to `[0, 100]`
    pub fn confidence(&self, signals: &QualitySignals) -> u32 {
        rounded(self.config.confidence_weights.apply(signals))
    }

    pub fn assignment_tier(&self, overall: u32) -> CredibilityTier {
        self.config.assignment_tiers.lookup(overall as f64)
    }

    pub fn display_tier(&self, overall: u32) -> CredibilityTier {
        self.config.display_tiers.lookup(overall as f64)
    }
}

fn unit_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn rounded(value: f64) -> u32 {
    unit_score(value).round() as u32
}
