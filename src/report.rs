//! The summary produced at the end of a replay.
//!
//! Percentages are derived here from [`ReplayStats`] and are never part of
//! the running state. A percentage with a zero denominator is `0.0`.

use std::fmt;
use serde::Serialize;
use crate::stats::{ratio, PolicyStats, ReplayStats};

/// Returns `num / den` as a percentage, or `0.0` when `den` is zero.
pub fn percent(num: usize, den: usize) -> f64 {
    ratio(num, den) * 100.0
}

/// Direction prediction results for one predictor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolicyReport {
    pub name: &'static str,
    pub hits: usize,
    pub misses: usize,
    /// Percentage of correct predictions
    pub accuracy: f64,
}
impl PolicyReport {
    pub fn new(name: &'static str, stats: &PolicyStats) -> Self {
        Self {
            name,
            hits: stats.hits,
            misses: stats.misses,
            accuracy: percent(stats.hits, stats.total()),
        }
    }
}

/// Target cache results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BtbReport {
    pub hits: usize,
    pub misses: usize,
    /// Percentage of lookups that hit
    pub hit_rate: f64,
    pub evictions: usize,
    /// Lookups that hit while the direction was mispredicted
    pub hit_mispredicted: usize,
    /// Fetches per record, counting one extra fetch for every BTB miss
    pub fetch_overhead: f64,
}

/// Statistics for a complete replay.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub total: usize,
    pub unique_branches: usize,
    pub static_policy: PolicyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_policy: Option<PolicyReport>,
    /// Accuracy of the dynamic predictor minus that of the static one, in
    /// percentage points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f64>,
    pub btb: BtbReport,
}

impl StatisticsReport {
    pub fn new(
        stats: &ReplayStats,
        static_name: &'static str,
        dynamic_name: &'static str,
    ) -> Self {
        let static_policy = PolicyReport::new(static_name, &stats.static_bp);
        let dynamic_policy = stats.dynamic_bp
            .as_ref()
            .map(|s| PolicyReport::new(dynamic_name, s));
        let improvement = dynamic_policy
            .as_ref()
            .map(|d| d.accuracy - static_policy.accuracy);
        Self {
            total: stats.total,
            unique_branches: stats.branches.num_unique_branches(),
            static_policy,
            dynamic_policy,
            improvement,
            btb: BtbReport {
                hits: stats.btb_hits,
                misses: stats.btb_misses,
                hit_rate: percent(stats.btb_hits, stats.btb_hits + stats.btb_misses),
                evictions: stats.btb_evictions,
                hit_mispredicted: stats.btb_hit_mispredicted,
                fetch_overhead: ratio(stats.total + stats.btb_misses, stats.total),
            },
        }
    }
}

impl fmt::Display for PolicyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "  Direction prediction hits:     {}", self.hits)?;
        writeln!(f, "  Direction prediction misses:   {}", self.misses)?;
        write!(f, "  Direction prediction accuracy: {:.2}%", self.accuracy)
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Branch Predictor Statistics")?;
        writeln!(f, "===========================")?;
        writeln!(f, "Total records processed: {}", self.total)?;
        writeln!(f, "Unique branches:         {}", self.unique_branches)?;
        writeln!(f)?;
        writeln!(f, "{}", self.static_policy)?;
        if let Some(dynamic) = &self.dynamic_policy {
            writeln!(f)?;
            writeln!(f, "{}", dynamic)?;
        }
        if let Some(improvement) = self.improvement {
            writeln!(f, "  Improvement over static:       {:+.2}%", improvement)?;
        }
        writeln!(f)?;
        writeln!(f, "BTB:")?;
        writeln!(f, "  Hits:                          {}", self.btb.hits)?;
        writeln!(f, "  Misses:                        {}", self.btb.misses)?;
        writeln!(f, "  Hit rate:                      {:.2}%", self.btb.hit_rate)?;
        writeln!(f, "  Evictions:                     {}", self.btb.evictions)?;
        writeln!(f, "  Fetch overhead:                {:.4}", self.btb.fetch_overhead)?;
        write!(f, "  Hits but direction mispredicted: {}", self.btb.hit_mispredicted)
    }
}
