//! Synthetic traces.
//!
//! A [`TraceSynthesizer`] holds a set of branch sites, each with a
//! [`BranchPattern`] that decides its outcome every time it is executed.
//! The order in which sites execute is drawn from a seeded RNG, so a given
//! seed always produces the same trace.

use rand::prelude::*;
use rand::rngs::StdRng;
use crate::branch::*;

/// A pre-determined pattern of outcomes associated with a branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BranchPattern {
    /// A branch whose outcome is always 'taken'.
    AlwaysTaken,

    /// A branch whose outcome is always 'not-taken'.
    NeverTaken,

    /// A branch whose outcome is only periodically "taken".
    /// Otherwise, the branch is "not-taken" by default.
    TakenPeriodic(usize),

    /// A branch whose outcome is only periodically "not-taken".
    /// Otherwise, the branch is "taken" by default.
    NotTakenPeriodic(usize),

    /// A branch with an arbitrary pattern of outcomes.
    Pattern(&'static [Outcome]),

    /// A branch that is taken with the given probability.
    Random(f64),
}
impl BranchPattern {
    /// Given the number of earlier executions, generate a branch outcome.
    pub fn outcome(&self, ctr: usize, rng: &mut impl Rng) -> Outcome {
        match *self {
            Self::AlwaysTaken => Outcome::T,
            Self::NeverTaken => Outcome::N,
            Self::TakenPeriodic(p) => {
                let p = p.max(1);
                Outcome::from(ctr % p == p - 1)
            },
            Self::NotTakenPeriodic(p) => {
                let p = p.max(1);
                Outcome::from(ctr % p != p - 1)
            },
            Self::Pattern(pat) if pat.is_empty() => Outcome::N,
            Self::Pattern(pat) => pat[ctr % pat.len()],
            Self::Random(p) if p.is_nan() => Outcome::N,
            Self::Random(p) => Outcome::from(rng.gen_bool(p.clamp(0.0, 1.0))),
        }
    }
}

#[derive(Clone, Debug)]
struct Site {
    kind: BranchKind,
    pc: u32,
    tgt: u32,
    pattern: BranchPattern,
    /// Number of times this site has executed
    ctr: usize,
}

/// Builds synthetic traces from a set of branch sites.
#[derive(Clone, Debug)]
pub struct TraceSynthesizer {
    sites: Vec<Site>,
    rng: StdRng,
}
impl TraceSynthesizer {
    pub fn new(seed: u64) -> Self {
        Self {
            sites: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Add a branch to `tgt`. The direction hint follows the target.
    pub fn add_branch(&mut self, pc: u32, tgt: u32, pattern: BranchPattern) {
        self.sites.push(Site { kind: BranchKind::Branch, pc, tgt, pattern, ctr: 0 });
    }

    /// Add a return.
    pub fn add_return(&mut self, pc: u32, pattern: BranchPattern) {
        self.sites.push(Site {
            kind: BranchKind::Return,
            pc,
            tgt: BranchRecord::NO_TARGET,
            pattern,
            ctr: 0,
        });
    }

    /// Add `n` sites with random targets and patterns, 16 bytes apart
    /// starting at `base`. About one in eight is a return.
    pub fn add_random_sites(&mut self, n: usize, base: u32) {
        for i in 0..n {
            let pc = base.wrapping_add(16 * i as u32);
            let pattern = match self.rng.gen_range(0..5) {
                0 => BranchPattern::AlwaysTaken,
                1 => BranchPattern::NeverTaken,
                2 => BranchPattern::TakenPeriodic(self.rng.gen_range(2..=8)),
                3 => BranchPattern::NotTakenPeriodic(self.rng.gen_range(2..=8)),
                _ => BranchPattern::Random(self.rng.gen()),
            };
            if self.rng.gen_ratio(1, 8) {
                self.add_return(pc, pattern);
            } else {
                let offset = self.rng.gen_range(4..0x1000u32) & !3;
                let tgt = if self.rng.gen() {
                    pc.wrapping_sub(offset)
                } else {
                    pc.wrapping_add(offset)
                };
                self.add_branch(pc, tgt, pattern);
            }
        }
    }

    pub fn num_sites(&self) -> usize { self.sites.len() }

    /// Generate `len` records, choosing a site uniformly at random for each.
    pub fn generate(&mut self, len: usize) -> Vec<BranchRecord> {
        let mut res = Vec::with_capacity(len);
        if self.sites.is_empty() {
            return res;
        }
        for _ in 0..len {
            let idx = self.rng.gen_range(0..self.sites.len());
            let site = &mut self.sites[idx];
            let outcome = site.pattern.outcome(site.ctr, &mut self.rng);
            site.ctr += 1;

            res.push(match site.kind {
                BranchKind::Branch => BranchRecord::branch(
                    site.pc, site.tgt, Direction::from_addrs(site.pc, site.tgt), outcome
                ),
                BranchKind::Return => BranchRecord::ret(site.pc, outcome),
            });
        }
        res
    }
}
