//! Counters collected during a simulation run.

use std::ops::{Index, IndexMut};

use rust_decimal::Decimal;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::schedule::PolicyKind;
use crate::task::Criticality;
use crate::Tick;

/// The counters kept for each criticality level.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounters {
    /// Instances released
    pub generated: u64,
    /// Instances that finished all their work
    pub completed: u64,
    /// Instances evicted because their deadline passed
    pub missed: u64,
}

impl LevelCounters {
    /// The share of released instances that missed their deadline.
    pub fn miss_ratio(&self) -> Option<Decimal> {
        ratio(self.missed, self.generated)
    }
}

/// Aggregate metrics of a simulation run.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    levels: [LevelCounters; 3],
    /// Ticks during which the unit held a task
    pub busy_ticks: u64,
    /// Ticks in which the unit changed from one task to another
    pub context_switches: u64,
    /// Context switches that displaced an unfinished task
    pub preemptions: u64,
}

impl Metrics {
    /// The counters of a single level.
    pub fn level(&self, level: Criticality) -> &LevelCounters {
        &self.levels[level.index()]
    }

    /// The per level counters from most to least severe.
    pub fn levels(&self) -> impl Iterator<Item = (Criticality, &LevelCounters)> {
        Criticality::ALL.into_iter().zip(self.levels.iter())
    }

    /// Sums up the counters of all levels.
    pub fn total(&self) -> LevelCounters {
        self.levels.iter().fold(LevelCounters::default(), |acc, c| LevelCounters {
            generated: acc.generated + c.generated,
            completed: acc.completed + c.completed,
            missed: acc.missed + c.missed,
        })
    }
}

impl Index<Criticality> for Metrics {
    type Output = LevelCounters;

    fn index(&self, level: Criticality) -> &Self::Output {
        &self.levels[level.index()]
    }
}

impl IndexMut<Criticality> for Metrics {
    fn index_mut(&mut self, level: Criticality) -> &mut Self::Output {
        &mut self.levels[level.index()]
    }
}

/// The outcome of a simulation run.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The policy the run was scheduled with
    pub policy: PolicyKind,
    /// The number of simulated ticks
    pub duration: Tick,
    #[allow(missing_docs)]
    pub metrics: Metrics,
}

impl Report {
    /// The fraction of ticks in which the unit was busy, zero for an empty run.
    pub fn utilization(&self) -> Decimal {
        ratio(self.metrics.busy_ticks, self.duration).unwrap_or(Decimal::ZERO)
    }

    /// The utilization in percent, rounded to two decimal places.
    pub fn utilization_percent(&self) -> Decimal {
        (self.utilization() * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<Decimal> {
    if denominator == 0 {
        return None;
    }
    Some(Decimal::from(numerator) / Decimal::from(denominator))
}
