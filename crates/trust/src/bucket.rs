use serde::{Deserialize, Serialize};

/// Which side of a threshold a metric must fall on to earn a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Bucket applies when `value >= threshold` (inclusive lower bound)
    HigherIsBetter,
    /// Bucket applies when `value < threshold` (exclusive upper bound)
    LowerIsBetter,
}

impl Direction {
    /// Zero on a lower-is-better metric means nothing was measured
    fn in_domain(&self, value: f64) -> bool {
        value.is_finite()
            && match self {
                Self::HigherIsBetter => value >= 0.0,
                Self::LowerIsBetter => value > 0.0,
            }
    }

    fn admits(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::HigherIsBetter => value >= threshold,
            Self::LowerIsBetter => value < threshold,
        }
    }
}

/// Ordered threshold table mapping a continuous metric onto discrete values
///
/// Buckets are listed from best to worst and the first one that admits the
/// value wins. Anything that matches no bucket, as well as negative, NaN or
/// infinite input, resolves to `floor`. So does zero on a lower-is-better
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTable<T> {
    pub direction: Direction,
    pub buckets: Vec<(f64, T)>,
    pub floor: T,
}

impl<T: Copy> BucketTable<T> {
    /// Table where larger metrics earn more (APY, volume, scores)
    pub fn higher_is_better(buckets: &[(f64, T)], floor: T) -> Self {
        Self {
            direction: Direction::HigherIsBetter,
            buckets: buckets.to_vec(),
            floor,
        }
    }

    /// Table where smaller metrics earn more (gas, latency)
    pub fn lower_is_better(buckets: &[(f64, T)], floor: T) -> Self {
        Self {
            direction: Direction::LowerIsBetter,
            buckets: buckets.to_vec(),
            floor,
        }
    }

    /// Resolve a metric to the value of the first matching bucket
    pub fn lookup(&self, value: f64) -> T {
        if !self.direction.in_domain(value) {
            tracing::debug!(value, "out-of-domain metric resolved to table floor");
            return self.floor;
        }
        self.buckets
            .iter()
            .find(|(threshold, _)| self.direction.admits(value, *threshold))
            .map(|(_, bucket)| *bucket)
            .unwrap_or(self.floor)
    }

    /// Threshold a metric must reach to earn `target`, if any bucket awards it
    pub fn threshold_for(&self, target: T) -> Option<f64>
    where
        T: PartialEq,
    {
        self.buckets
            .iter()
            .find(|(_, bucket)| *bucket == target)
            .map(|(threshold, _)| *threshold)
    }
}

impl<T: Copy + PartialOrd + std::fmt::Debug> BucketTable<T> {
    /// Check that thresholds run from best to worst and values never improve
    /// as the metric gets worse, which keeps lookups monotonic.
    pub fn validate(&self, name: &str) -> crate::Result<()> {
        for (threshold, _) in &self.buckets {
            if !threshold.is_finite() {
                return Err(crate::ScoringError::InvalidTable(format!(
                    "{name}: threshold {threshold} is not finite"
                )));
            }
        }

        for pair in self.buckets.windows(2) {
            let (better, worse) = (&pair[0], &pair[1]);
            let ordered = match self.direction {
                Direction::HigherIsBetter => better.0 > worse.0,
                Direction::LowerIsBetter => better.0 < worse.0,
            };
            if !ordered {
                return Err(crate::ScoringError::InvalidTable(format!(
                    "{name}: thresholds {} and {} are out of order",
                    better.0, worse.0
                )));
            }
            if better.1 < worse.1 {
                return Err(crate::ScoringError::InvalidTable(format!(
                    "{name}: bucket value {:?} ranks below {:?}",
                    better.1, worse.1
                )));
            }
        }

        if let Some((_, last)) = self.buckets.last() {
            if *last < self.floor {
                return Err(crate::ScoringError::InvalidTable(format!(
                    "{name}: floor {:?} ranks above the last bucket",
                    self.floor
                )));
            }
        }

        Ok(())
    }
}

/// Linear points scale: `floor(clamp(value, 0, max_input) / max_input * max_points)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub max_input: f64,
    pub max_points: u32,
}

impl LinearScale {
    pub fn points(&self, value: f64) -> u32 {
        if !value.is_finite() || value <= 0.0 || self.max_input <= 0.0 {
            return 0;
        }
        let ratio = value.min(self.max_input) / self.max_input;
        (ratio * self.max_points as f64).floor() as u32
    }
}
