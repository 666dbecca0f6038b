//! Replaying one trace over a range of BTB sizes.

use std::fmt;
use std::num::NonZeroUsize;
use serde::Serialize;
use crate::branch::BranchRecord;
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::report::StatisticsReport;
use crate::sim::Simulator;

/// BTB sizes swept when none are given.
pub const DEFAULT_CAPACITIES: &[usize] = &[1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024];

/// Results for one BTB size.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub btb_capacity: usize,
    pub pht_size: usize,
    pub report: StatisticsReport,
}

/// Results for every BTB size in a sweep, in the order they were given.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    /// Replay `records` once per capacity, each time with a fresh
    /// [`Simulator`] built from `base`.
    ///
    /// The counter table has `pht_size` entries when given, and otherwise
    /// one entry per BTB line. Every capacity is validated before the first
    /// replay starts.
    pub fn run(
        records: &[BranchRecord],
        base: &SimConfig,
        capacities: &[usize],
        pht_size: Option<NonZeroUsize>,
    ) -> Result<Self, ConfigError> {
        let configs = capacities.iter()
            .map(|&capacity| {
                let mut cfg = base.with_btb_capacity(capacity)?;
                cfg.pht_size = pht_size.unwrap_or(cfg.btb_capacity);
                Ok(cfg)
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let points = configs.iter()
            .map(|cfg| {
                let mut sim = Simulator::from_config(cfg);
                sim.run(records);
                SweepPoint {
                    btb_capacity: cfg.btb_capacity.get(),
                    pht_size: cfg.pht_size.get(),
                    report: sim.report(),
                }
            })
            .collect();
        Ok(Self { points })
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8} {:>8} {:>10} {:>10} {:>12} {:>10} {:>10}",
            "BTB", "PHT", "static", "dynamic", "improvement", "BTB hits", "overhead"
        )?;
        for p in &self.points {
            let r = &p.report;
            let dynamic = r.dynamic_policy.as_ref()
                .map_or("-".to_string(), |d| format!("{:.2}%", d.accuracy));
            let improvement = r.improvement
                .map_or("-".to_string(), |i| format!("{:+.2}%", i));
            write!(f, "\n{:>8} {:>8} {:>9.2}% {:>10} {:>12} {:>9.2}% {:>10.4}",
                p.btb_capacity, p.pht_size,
                r.static_policy.accuracy, dynamic, improvement,
                r.btb.hit_rate, r.btb.fetch_overhead,
            )?;
        }
        Ok(())
    }
}
