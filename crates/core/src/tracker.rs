//! Per-opportunity score tracker.
//!
//! Records live in a keyed store. An update for one id holds that id's entry
//! for the whole read-modify-write, so concurrent updates to the same id are
//! applied one after another and none of their history entries is lost, while
//! updates to different ids proceed independently.

use std::collections::VecDeque;

use bondcredit_trust::{OpportunityConfig, OpportunityScorer};
use bondcredit_types::{MetricsSnapshot, OpportunityScore, RiskLevel};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{MetricsProvider, OpportunityDescriptor, Result, TrackerError};

/// Snapshots kept per opportunity unless configured otherwise
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// Score-change events kept unless configured otherwise
pub const DEFAULT_MAX_EVENTS: usize = 1000;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum snapshots kept per opportunity; the oldest are dropped first
    pub max_history: usize,
    /// Maximum score-change events kept across all opportunities
    pub max_events: usize,
    /// Tables used to score refreshed metrics
    pub scoring: OpportunityConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            max_events: DEFAULT_MAX_EVENTS,
            scoring: OpportunityConfig::default(),
        }
    }
}

/// A score captured at one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub recorded_at: DateTime<Utc>,
    pub score: OpportunityScore,
}

/// Current score and score history of one opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityScoreRecord {
    pub opportunity_id: String,
    pub name: String,
    pub contract_address: String,
    pub category: String,
    pub current_score: OpportunityScore,
    /// Oldest first
    pub history: VecDeque<ScoreSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Updates applied since creation, including any whose snapshot has
    /// since been dropped from `history`
    pub update_count: u64,
}

impl OpportunityScoreRecord {
    fn new(opportunity: &OpportunityDescriptor, score: OpportunityScore, now: DateTime<Utc>) -> Self {
        Self {
            opportunity_id: opportunity.id.clone(),
            name: opportunity.name.clone(),
            contract_address: opportunity.contract_address.clone(),
            category: opportunity.category.clone(),
            current_score: score,
            history: VecDeque::new(),
            created_at: now,
            updated_at: now,
            update_count: 0,
        }
    }

    /// Replace the current score and append it to the history
    fn apply(
        &mut self,
        opportunity: &OpportunityDescriptor,
        score: OpportunityScore,
        recorded_at: DateTime<Utc>,
        max_history: usize,
    ) {
        self.name.clone_from(&opportunity.name);
        self.contract_address.clone_from(&opportunity.contract_address);
        self.category.clone_from(&opportunity.category);
        self.current_score = score;
        self.updated_at = recorded_at;
        self.update_count += 1;
        self.history.push_back(ScoreSnapshot { recorded_at, score });

        let excess = self.history.len().saturating_sub(max_history.max(1));
        if excess > 0 {
            self.history.drain(..excess);
            debug!(
                opportunity_id = %self.opportunity_id,
                dropped = excess,
                "trimmed score history"
            );
        }
    }

    pub fn total(&self) -> u32 {
        self.current_score.total()
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.current_score.risk_level
    }

    pub fn latest_snapshot(&self) -> Option<&ScoreSnapshot> {
        self.history.back()
    }
}

/// Score movement recorded on every update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChangeEvent {
    pub event_id: Uuid,
    pub opportunity_id: String,
    pub opportunity_name: String,
    /// `None` for the first score of an opportunity
    pub old_total: Option<u32>,
    pub new_total: u32,
    pub score_change: i32,
    pub risk_level: RiskLevel,
    pub recorded_at: DateTime<Utc>,
}

/// Keeps the latest score and score history of every opportunity
#[derive(Debug)]
pub struct OpportunityScoreTracker {
    scorer: OpportunityScorer,
    max_history: usize,
    max_events: usize,
    records: DashMap<String, OpportunityScoreRecord>,
    events: Mutex<VecDeque<ScoreChangeEvent>>,
}

impl Default for OpportunityScoreTracker {
    fn default() -> Self {
        Self::from_parts(TrackerConfig::default())
    }
}

impl OpportunityScoreTracker {
    /// Create a tracker, rejecting invalid scoring tables
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.scoring.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: TrackerConfig) -> Self {
        Self {
            scorer: OpportunityScorer::new(config.scoring),
            max_history: config.max_history,
            max_events: config.max_events,
            records: DashMap::new(),
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Recompute the score of an opportunity from fresh metrics
    ///
    /// Creates the record on first use, replaces its current score, appends
    /// a timestamped snapshot to its history and returns the updated record.
    pub fn update(
        &self,
        id: &str,
        name: &str,
        contract_address: &str,
        metrics: &MetricsSnapshot,
        category: &str,
    ) -> Result<OpportunityScoreRecord> {
        let opportunity = OpportunityDescriptor::new(id, name, contract_address, category);
        self.update_opportunity(&opportunity, metrics)
    }

    /// [`update`](Self::update) taking the registry details as one value
    pub fn update_opportunity(
        &self,
        opportunity: &OpportunityDescriptor,
        metrics: &MetricsSnapshot,
    ) -> Result<OpportunityScoreRecord> {
        if opportunity.id.trim().is_empty() {
            return Err(TrackerError::InvalidOpportunityId(opportunity.id.clone()));
        }

        let score = self.scorer.score(metrics);

        // The entry guard is held until the event is logged, so both the
        // record and the event log observe same-id updates in one order.
        let mut entry = self
            .records
            .entry(opportunity.id.clone())
            .or_insert_with(|| {
                info!(opportunity = %opportunity, "tracking new opportunity");
                OpportunityScoreRecord::new(opportunity, score, Utc::now())
            });

        let record = entry.value_mut();
        let old_total = record.latest_snapshot().map(|snapshot| snapshot.score.total());
        let recorded_at = Utc::now().max(record.updated_at);
        record.apply(opportunity, score, recorded_at, self.max_history);

        let event = ScoreChangeEvent {
            event_id: Uuid::new_v4(),
            opportunity_id: record.opportunity_id.clone(),
            opportunity_name: record.name.clone(),
            old_total,
            new_total: score.total(),
            score_change: score.total() as i32 - old_total.unwrap_or(0) as i32,
            risk_level: score.risk_level,
            recorded_at,
        };
        self.record_event(event);

        let updated = record.clone();
        drop(entry);

        debug!(
            opportunity_id = %updated.opportunity_id,
            total = updated.total(),
            risk_level = %updated.risk_level(),
            history = updated.history.len(),
            "updated opportunity score"
        );

        Ok(updated)
    }

    /// Pull fresh metrics from `provider` and apply them with [`update`](Self::update)
    pub fn refresh(
        &self,
        opportunity: &OpportunityDescriptor,
        provider: &dyn MetricsProvider,
    ) -> Result<OpportunityScoreRecord> {
        let metrics = provider.metrics_for(opportunity)?;
        self.update_opportunity(opportunity, &metrics)
    }

    fn record_event(&self, event: ScoreChangeEvent) {
        let mut events = self.events.lock();
        events.push_back(event);
        while events.len() > self.max_events.max(1) {
            events.pop_front();
        }
    }

    /// Read-only copy of a record; never recomputes
    pub fn get(&self, id: &str) -> Option<OpportunityScoreRecord> {
        self.records.get(id).map(|record| record.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tracked ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Score history of an opportunity, oldest first
    pub fn history(&self, id: &str) -> Option<Vec<ScoreSnapshot>> {
        self.records
            .get(id)
            .map(|record| record.history.iter().copied().collect())
    }

    /// Highest scoring opportunities, ties broken by id
    pub fn top_opportunities(&self, limit: usize) -> Vec<OpportunityScoreRecord> {
        let mut records = self.snapshot_records();
        records.sort_by(|a, b| {
            b.total()
                .cmp(&a.total())
                .then_with(|| a.opportunity_id.cmp(&b.opportunity_id))
        });
        records.truncate(limit);
        records
    }

    /// Opportunities with `min <= total <= max`, sorted by id
    pub fn opportunities_by_score_range(
        &self,
        min: u32,
        max: u32,
        limit: usize,
    ) -> Vec<OpportunityScoreRecord> {
        let mut records: Vec<_> = self
            .snapshot_records()
            .into_iter()
            .filter(|record| (min..=max).contains(&record.total()))
            .collect();
        records.sort_by(|a, b| a.opportunity_id.cmp(&b.opportunity_id));
        records.truncate(limit);
        records
    }

    /// Opportunities listed under `category`, sorted by id
    pub fn opportunities_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Vec<OpportunityScoreRecord> {
        let mut records: Vec<_> = self
            .snapshot_records()
            .into_iter()
            .filter(|record| record.category == category)
            .collect();
        records.sort_by(|a, b| a.opportunity_id.cmp(&b.opportunity_id));
        records.truncate(limit);
        records
    }

    /// Opportunities currently at `level`, sorted by id
    pub fn opportunities_by_risk(&self, level: RiskLevel) -> Vec<OpportunityScoreRecord> {
        let mut records: Vec<_> = self
            .snapshot_records()
            .into_iter()
            .filter(|record| record.risk_level() == level)
            .collect();
        records.sort_by(|a, b| a.opportunity_id.cmp(&b.opportunity_id));
        records
    }

    /// Most recent score-change events, newest first
    pub fn recent_events(&self, limit: usize) -> Vec<ScoreChangeEvent> {
        self.events.lock().iter().rev().take(limit).cloned().collect()
    }

    fn snapshot_records(&self) -> Vec<OpportunityScoreRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }
}
