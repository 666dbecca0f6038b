//! Helpers for collecting statistics.

use std::cmp::Reverse;
use std::collections::*;
use bitvec::prelude::*;
use itertools::*;
use crate::branch::*;

/// Hit/miss counters for one direction predictor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyStats {
    /// Number of correct predictions
    pub hits: usize,
    /// Number of incorrect predictions
    pub misses: usize,
}
impl PolicyStats {
    /// Record one prediction. Returns true when it was correct.
    pub fn record(&mut self, prediction: Outcome, outcome: Outcome) -> bool {
        let hit = prediction == outcome;
        if hit { self.hits += 1; } else { self.misses += 1; }
        hit
    }

    pub fn total(&self) -> usize { self.hits + self.misses }
}

/// Container for the counters accumulated over one replay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayStats {
    /// Number of records replayed
    pub total: usize,

    /// Number of records whose address was found in the BTB
    pub btb_hits: usize,

    /// Number of records whose address was not found in the BTB
    pub btb_misses: usize,

    /// Number of valid BTB lines overwritten by a fill
    pub btb_evictions: usize,

    /// Number of records that hit in the BTB but whose direction was
    /// mispredicted by the active predictor
    pub btb_hit_mispredicted: usize,

    /// Static predictor results
    pub static_bp: PolicyStats,

    /// Two-bit predictor results (absent when it did not run)
    pub dynamic_bp: Option<PolicyStats>,

    /// Per-branch statistics (indexed by program counter value)
    pub branches: BranchStats,
}

/// Per-branch statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchStats {
    pub data: BTreeMap<u32, BranchData>,
}
impl BranchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: u32) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: u32) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Update per-branch statistics.
    pub fn update(&mut self, record: &BranchRecord, btb_hit: bool, hit: bool) {
        let data = self.get_mut(record.pc);
        data.occ += 1;
        data.outcomes.push(record.outcome.into());
        if btb_hit { data.btb_hits += 1; }
        if hit { data.hits += 1; }
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the `n` most frequently executed branches.
    pub fn top_branches(&self, n: usize) -> Vec<(u32, &BranchData)> {
        self.data.iter()
            .sorted_by_key(|(pc, data)| (Reverse(data.occ), **pc))
            .take(n)
            .map(|(pc, data)| (*pc, data))
            .collect()
    }

    /// Returns the `n` branches with the lowest hit rate among those
    /// executed at least `min_occ` times.
    pub fn hardest_branches(&self, n: usize, min_occ: usize) -> Vec<(u32, &BranchData)> {
        self.data.iter()
            .filter(|(_, data)| data.occ >= min_occ)
            .sorted_by(|x, y| {
                x.1.hit_rate().total_cmp(&y.1.hit_rate())
                    .then(y.1.occ.cmp(&x.1.occ))
                    .then(x.0.cmp(y.0))
            })
            .take(n)
            .map(|(pc, data)| (*pc, data))
            .collect()
    }
}

/// Container for statistics about a single branch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Number of times this branch was found in the BTB.
    pub btb_hits: usize,

    /// Record of all observed outcomes for this branch.
    pub outcomes: BitVec,
}
impl BranchData {
    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.occ)
    }

    /// Return the fraction of executions that were taken.
    pub fn taken_ratio(&self) -> f64 {
        ratio(self.outcomes.count_ones(), self.outcomes.len())
    }

    pub fn is_always_taken(&self) -> bool {
        self.outcomes.all()
    }

    pub fn is_never_taken(&self) -> bool {
        self.outcomes.not_any()
    }
}

/// Returns `num / den`, or `0.0` when `den` is zero.
pub fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[cfg(test)]
mod test {
    use super::*;

    fn rec(pc: u32, taken: bool) -> BranchRecord {
        BranchRecord::branch(pc, 0, Direction::Unknown, taken.into())
    }

    #[test]
    fn policy_stats_count_hits_and_misses() {
        let mut s = PolicyStats::default();
        assert!(s.record(Outcome::T, Outcome::T));
        assert!(!s.record(Outcome::T, Outcome::N));
        assert!(s.record(Outcome::N, Outcome::N));
        assert_eq!((s.hits, s.misses, s.total()), (2, 1, 3));
    }

    #[test]
    fn per_branch_outcomes() {
        let mut s = BranchStats::new();
        s.update(&rec(0x10, true), false, true);
        s.update(&rec(0x10, true), true, false);
        s.update(&rec(0x20, false), false, true);

        let a = s.get(0x10).unwrap();
        assert_eq!((a.occ, a.hits, a.btb_hits), (2, 1, 1));
        assert!(a.is_always_taken());
        assert_eq!(a.hit_rate(), 0.5);
        let b = s.get(0x20).unwrap();
        assert!(b.is_never_taken());
        assert_eq!(b.taken_ratio(), 0.0);
        assert_eq!(s.num_unique_branches(), 2);
    }

    #[test]
    fn rankings() {
        let mut s = BranchStats::new();
        for _ in 0..3 { s.update(&rec(0x30, true), true, true); }
        for _ in 0..2 { s.update(&rec(0x20, true), true, false); }
        s.update(&rec(0x10, false), false, false);

        let top: Vec<u32> = s.top_branches(2).into_iter().map(|(pc, _)| pc).collect();
        assert_eq!(top, vec![0x30, 0x20]);

        let hard: Vec<u32> = s.hardest_branches(5, 2).into_iter().map(|(pc, _)| pc).collect();
        assert_eq!(hard, vec![0x20, 0x30]);
    }

    #[test]
    fn ratio_of_nothing_is_zero() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(3, 4), 0.75);
        assert_eq!(crate::report::percent(3, 4), ratio(3, 4) * 100.0);
    }

    #[test]
    fn empty_branch_has_zero_rates() {
        let d = BranchData::default();
        assert_eq!(d.hit_rate(), 0.0);
        assert_eq!(d.taken_ratio(), 0.0);
    }
}
