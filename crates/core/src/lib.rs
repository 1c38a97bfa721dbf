//! Opportunity score tracking for the Bond Credit dashboard.
//!
//! This crate keeps the latest score and a bounded score history for every
//! opportunity the dashboard lists, recomputing scores whenever fresh metrics
//! arrive from a caller-supplied metrics source.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod metrics;
pub mod tracker;

pub use metrics::{MetricsProvider, SimulatedMetrics};
pub use tracker::{
    OpportunityScoreRecord, OpportunityScoreTracker, ScoreChangeEvent, ScoreSnapshot,
    TrackerConfig, DEFAULT_MAX_EVENTS, DEFAULT_MAX_HISTORY,
};

pub use bondcredit_trust as trust;
pub use bondcredit_types as types;

/// Errors that can occur while tracking opportunity scores
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid opportunity identifier: {0:?}")]
    InvalidOpportunityId(String),

    #[error("Metrics unavailable for {opportunity}: {reason}")]
    MetricsUnavailable { opportunity: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scoring configuration error: {0}")]
    Scoring(#[from] bondcredit_trust::ScoringError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Registry details identifying an opportunity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpportunityDescriptor {
    pub id: String,
    pub name: String,
    pub contract_address: String,
    pub category: String,
}

impl OpportunityDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        contract_address: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contract_address: contract_address.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for OpportunityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
