//! Protocol rewards tiers
//!
//! Three activity metrics are bucketed independently (at most 8 + 8 + 4
//! points), the sum is mapped onto a tier, and the tier onto a fixed payout.

use bondcredit_types::{ActivityMetrics, ActivityPoints, RewardEstimate, RewardTier};
use serde::{Deserialize, Serialize};

use crate::bucket::BucketTable;

/// Highest points total a protocol can reach
pub const MAX_REWARD_POINTS: u32 = 20;

/// Transaction volume in USD
pub const VOLUME_POINTS: &[(f64, u32)] = &[(10000.0, 8), (5000.0, 6), (1000.0, 4), (100.0, 2)];

/// Smart contract call count
pub const CONTRACT_CALL_POINTS: &[(f64, u32)] = &[(500.0, 8), (250.0, 6), (100.0, 4), (50.0, 2)];

/// Unique wallet count
pub const UNIQUE_WALLET_POINTS: &[(f64, u32)] = &[(100.0, 4), (50.0, 3), (25.0, 2), (10.0, 1)];

/// Points total to tier, inclusive lower bounds
pub const REWARD_TIERS: &[(f64, RewardTier)] = &[
    (17.0, RewardTier::Diamond),
    (14.0, RewardTier::Gold),
    (11.0, RewardTier::Silver),
    (8.0, RewardTier::Bronze),
    (4.0, RewardTier::Contributor),
    (1.0, RewardTier::Explorer),
];

/// Payout per tier in USD
pub const REWARD_PAYOUTS: &[(RewardTier, u64)] = &[
    (RewardTier::Diamond, 10_000),
    (RewardTier::Gold, 6_000),
    (RewardTier::Silver, 3_500),
    (RewardTier::Bronze, 1_500),
    (RewardTier::Contributor, 500),
    (RewardTier::Explorer, 100),
    (RewardTier::NoTier, 0),
];

/// Tables behind the rewards estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardsConfig {
    pub volume_points: BucketTable<u32>,
    pub contract_call_points: BucketTable<u32>,
    pub unique_wallet_points: BucketTable<u32>,
    pub tiers: BucketTable<RewardTier>,
    pub payouts: Vec<(RewardTier, u64)>,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            volume_points: BucketTable::higher_is_better(VOLUME_POINTS, 0),
            contract_call_points: BucketTable::higher_is_better(CONTRACT_CALL_POINTS, 0),
            unique_wallet_points: BucketTable::higher_is_better(UNIQUE_WALLET_POINTS, 0),
            tiers: BucketTable::higher_is_better(REWARD_TIERS, RewardTier::NoTier),
            payouts: REWARD_PAYOUTS.to_vec(),
        }
    }
}

impl RewardsConfig {
    pub fn validate(&self) -> crate::Result<()> {
        self.volume_points.validate("volume_points")?;
        self.contract_call_points.validate("contract_call_points")?;
        self.unique_wallet_points.validate("unique_wallet_points")?;
        self.tiers.validate("reward_tiers")?;

        // Exactly one amount per tier
        for tier in RewardTier::ALL {
            match self.payouts.iter().filter(|(t, _)| *t == tier).count() {
                1 => {}
                0 => {
                    return Err(crate::ScoringError::InvalidTable(format!(
                        "reward payouts: no amount for tier {tier}"
                    )))
                }
                n => {
                    return Err(crate::ScoringError::InvalidTable(format!(
                        "reward payouts: {n} amounts for tier {tier}"
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Estimates protocol rewards from on-chain activity
#[derive(Debug, Clone, Default)]
pub struct RewardsCalculator {
    config: RewardsConfig,
}

impl RewardsCalculator {
    pub fn new(config: RewardsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardsConfig {
        &self.config
    }

    pub fn estimate(&self, metrics: &ActivityMetrics) -> RewardEstimate {
        let breakdown = self.points(metrics);
        let points = breakdown.total().min(MAX_REWARD_POINTS);
        let tier = self.tier(points);
        let estimate = RewardEstimate {
            points,
            tier,
            reward_usd: self.payout(tier),
            breakdown,
        };

        tracing::debug!(
            points,
            tier = %tier,
            reward_usd = estimate.reward_usd,
            "estimated protocol rewards"
        );

        estimate
    }

    /// Points earned by each metric
    pub fn points(&self, metrics: &ActivityMetrics) -> ActivityPoints {
        ActivityPoints {
            volume: self.config.volume_points.lookup(metrics.transaction_volume_usd),
            contract_calls: self
                .config
                .contract_call_points
                .lookup(metrics.smart_contract_calls as f64),
            unique_wallets: self
                .config
                .unique_wallet_points
                .lookup(metrics.unique_wallets as f64),
        }
    }

    pub fn tier(&self, points: u32) -> RewardTier {
        self.config.tiers.lookup(points as f64)
    }

    /// Payout for a tier; tiers missing from the table pay nothing
    pub fn payout(&self, tier: RewardTier) -> u64 {
        self.config
            .payouts
            .iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    /// The next tier up and the points still missing to reach it
    pub fn points_to_next_tier(&self, points: u32) -> Option<(RewardTier, u32)> {
        let next = self.tier(points).next_tier()?;
        let threshold = self.config.tiers.threshold_for(next)?;
        Some((next, (threshold.ceil() as u32).saturating_sub(points)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(volume: f64, calls: u64, wallets: u64) -> ActivityMetrics {
        ActivityMetrics {
            transaction_volume_usd: volume,
            smart_contract_calls: calls,
            unique_wallets: wallets,
        }
    }

    #[test]
    fn test_metric_thresholds_are_inclusive() {
        let calculator = RewardsCalculator::default();
        let points = calculator.points(&activity(100.0, 50, 10));
        assert_eq!(points, ActivityPoints { volume: 2, contract_calls: 2, unique_wallets: 1 });

        let points = calculator.points(&activity(99.99, 49, 9));
        assert_eq!(points.total(), 0);

        let points = calculator.points(&activity(10000.0, 500, 100));
        assert_eq!(points, ActivityPoints { volume: 8, contract_calls: 8, unique_wallets: 4 });
    }

    #[test]
    fn test_maximum_activity_is_diamond() {
        let estimate = RewardsCalculator::default().estimate(&activity(1_000_000.0, 10_000, 5_000));
        assert_eq!(estimate.points, 20);
        assert_eq!(estimate.tier, RewardTier::Diamond);
        assert_eq!(estimate.reward_usd, 10_000);
    }

    #[test]
    fn test_tier_boundaries() {
        let calculator = RewardsCalculator::default();
        assert_eq!(calculator.tier(17), RewardTier::Diamond);
        assert_eq!(calculator.tier(16), RewardTier::Gold);
        assert_eq!(calculator.tier(14), RewardTier::Gold);
        assert_eq!(calculator.tier(13), RewardTier::Silver);
        assert_eq!(calculator.tier(11), RewardTier::Silver);
        assert_eq!(calculator.tier(8), RewardTier::Bronze);
        assert_eq!(calculator.tier(4), RewardTier::Contributor);
        assert_eq!(calculator.tier(1), RewardTier::Explorer);
        assert_eq!(calculator.tier(0), RewardTier::NoTier);
    }

    #[test]
    fn test_exact_point_totals() {
        let calculator = RewardsCalculator::default();

        // 6 + 8 + 3
        let estimate = calculator.estimate(&activity(5000.0, 500, 50));
        assert_eq!(estimate.points, 17);
        assert_eq!(estimate.tier, RewardTier::Diamond);
        assert_eq!(estimate.reward_usd, 10_000);

        // 8 + 6 + 2
        let estimate = calculator.estimate(&activity(10000.0, 250, 25));
        assert_eq!(estimate.points, 16);
        assert_eq!(estimate.tier, RewardTier::Gold);
        assert_eq!(estimate.reward_usd, 6_000);

        let estimate = calculator.estimate(&ActivityMetrics::default());
        assert_eq!(estimate.points, 0);
        assert_eq!(estimate.tier, RewardTier::NoTier);
        assert_eq!(estimate.reward_usd, 0);
    }

    #[test]
    fn test_negative_volume_earns_nothing() {
        let estimate = RewardsCalculator::default().estimate(&activity(-500.0, 0, 12));
        assert_eq!(estimate.points, 1);
        assert_eq!(estimate.tier, RewardTier::Explorer);
    }

    #[test]
    fn test_payout_table() {
        let calculator = RewardsCalculator::default();
        let payouts: Vec<u64> = RewardTier::ALL.iter().map(|t| calculator.payout(*t)).collect();
        assert_eq!(payouts, vec![0, 100, 500, 1_500, 3_500, 6_000, 10_000]);
    }

    #[test]
    fn test_points_to_next_tier() {
        let calculator = RewardsCalculator::default();
        assert_eq!(calculator.points_to_next_tier(0), Some((RewardTier::Explorer, 1)));
        assert_eq!(calculator.points_to_next_tier(12), Some((RewardTier::Gold, 2)));
        assert_eq!(calculator.points_to_next_tier(16), Some((RewardTier::Diamond, 1)));
        assert_eq!(calculator.points_to_next_tier(20), None);
    }

    #[test]
    fn test_validate_requires_every_payout() {
        let mut config = RewardsConfig::default();
        config.payouts.retain(|(tier, _)| *tier != RewardTier::Explorer);
        assert!(config.validate().is_err());
        assert!(RewardsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_payouts() {
        let mut config = RewardsConfig::default();
        config.payouts.push((RewardTier::Gold, 1));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, crate::ScoringError::InvalidTable(_)));
        assert!(err.to_string().contains("2 amounts for tier Gold"));
    }
}
