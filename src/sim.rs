//! Replay of a branch trace against a simulated front-end.

use crate::branch::*;
use crate::config::{FillPolicy, PredictorMode, SimConfig};
use crate::predictor::*;
use crate::report::StatisticsReport;
use crate::stats::{PolicyStats, ReplayStats};

/// Drives one replay.
///
/// Each record is first measured against the current state of the target
/// cache and the predictors, and only then used to update them.
#[derive(Clone, Debug)]
pub struct Simulator {
    btb: TargetCache,
    static_bp: StaticPredictor,
    /// When present, this is the active predictor
    dynamic_bp: Option<TwoBitPredictor>,
    fill: FillPolicy,
    stats: ReplayStats,
}

impl Simulator {
    pub fn new(
        btb: TargetCache,
        static_bp: StaticPredictor,
        dynamic_bp: Option<TwoBitPredictor>,
        fill: FillPolicy,
    ) -> Self {
        let stats = ReplayStats {
            dynamic_bp: dynamic_bp.as_ref().map(|_| PolicyStats::default()),
            ..Default::default()
        };
        Self { btb, static_bp, dynamic_bp, fill, stats }
    }

    /// Build a simulator with fresh state for `cfg`.
    pub fn from_config(cfg: &SimConfig) -> Self {
        let dynamic_bp = match cfg.mode {
            PredictorMode::Static => None,
            PredictorMode::Dynamic => Some(TwoBitPredictor::new(
                CounterTable::new(cfg.pht_size, cfg.initial_state),
            )),
        };
        Self::new(
            TargetCache::new(cfg.btb_capacity),
            StaticPredictor::new(cfg.static_rule),
            dynamic_bp,
            cfg.fill,
        )
    }

    /// Return the predicted target for a branch at `pc`.
    pub fn predict_target(&mut self, pc: u32) -> Option<u32> {
        self.btb.lookup(pc)
    }

    /// Replay a single record.
    pub fn step(&mut self, record: &BranchRecord) {
        let btb_hit = self.predict_target(record.pc).is_some();
        if btb_hit {
            self.stats.btb_hits += 1;
        } else {
            self.stats.btb_misses += 1;
        }

        let static_pred = self.static_bp.predict(record, &self.btb);
        let static_hit = self.stats.static_bp.record(static_pred, record.outcome);

        let dynamic_pred = self.dynamic_bp.as_ref()
            .map(|bp| bp.predict(record, &self.btb));
        let hit = match (dynamic_pred, self.stats.dynamic_bp.as_mut()) {
            (Some(pred), Some(stats)) => stats.record(pred, record.outcome),
            _ => static_hit,
        };

        if btb_hit && !hit {
            self.stats.btb_hit_mispredicted += 1;
        }
        self.stats.total += 1;
        self.stats.branches.update(record, btb_hit, hit);

        log::trace!("{:08x} btb_hit={} static={:?} dynamic={:?} outcome={:?}",
            record.pc, btb_hit, static_pred, dynamic_pred, record.outcome
        );

        self.resolve(record);
    }

    /// Update the target cache and predictors with a resolved record.
    fn resolve(&mut self, record: &BranchRecord) {
        if self.fill.should_fill(record.is_taken()) {
            if let Some(evicted) = self.btb.insert(record.pc, record.tgt) {
                log::debug!("evicted {:08x} -> {:08x} for {:08x}",
                    evicted.pc, evicted.tgt, record.pc
                );
                self.stats.btb_evictions += 1;
            }
        }
        self.static_bp.update(record);
        if let Some(bp) = self.dynamic_bp.as_mut() {
            bp.update(record);
        }
    }

    /// Replay every record in order.
    pub fn run<'a>(&mut self, records: impl IntoIterator<Item = &'a BranchRecord>) {
        log::info!("replaying with a {}-entry BTB, static rule {:?}{}",
            self.btb.capacity(),
            self.static_bp.rule(),
            match &self.dynamic_bp {
                Some(bp) => format!(", {}-entry counter table", bp.table().size()),
                None => String::new(),
            },
        );
        for record in records {
            self.step(record);
        }
        log::info!("replayed {} records", self.stats.total);
    }

    pub fn stats(&self) -> &ReplayStats { &self.stats }

    pub fn into_stats(self) -> ReplayStats { self.stats }

    pub fn btb(&self) -> &TargetCache { &self.btb }

    /// The two-bit predictor's counters, when it is running.
    pub fn counters(&self) -> Option<&CounterTable> {
        self.dynamic_bp.as_ref().map(|bp| bp.table())
    }

    /// Summarize the replay so far.
    pub fn report(&self) -> StatisticsReport {
        let dynamic_name = self.dynamic_bp.as_ref()
            .map_or("", |bp| bp.name());
        StatisticsReport::new(&self.stats, self.static_bp.name(), dynamic_name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trace::synth::*;

    fn taken(pc: u32, tgt: u32) -> BranchRecord {
        BranchRecord::branch(pc, tgt, Direction::from_addrs(pc, tgt), Outcome::T)
    }

    fn not_taken(pc: u32, tgt: u32) -> BranchRecord {
        BranchRecord::branch(pc, tgt, Direction::from_addrs(pc, tgt), Outcome::N)
    }

    fn sim(capacity: usize, mode: PredictorMode) -> Simulator {
        let cfg = SimConfig::new(capacity).unwrap().with_mode(mode);
        Simulator::from_config(&cfg)
    }

    #[test]
    fn relookup_after_other_insert_hits() {
        let (a, b) = (0x1000, 0x2000);
        let mut s = sim(2, PredictorMode::Static);
        s.run(&[taken(a, 0x40), taken(b, 0x80), taken(a, 0x40)]);
        let st = s.stats();
        assert_eq!(st.btb_misses, 2);
        assert_eq!(st.btb_hits, 1);
        // Cache presence predicts 'not taken' until a line is filled.
        assert_eq!(st.static_bp, PolicyStats { hits: 1, misses: 2 });
        assert_eq!(st.dynamic_bp, None);
    }

    #[test]
    fn not_taken_branches_are_never_cached() {
        let mut s = sim(4, PredictorMode::Static);
        s.run(&[not_taken(0x10, 0x20), not_taken(0x10, 0x20)]);
        assert!(s.btb().is_empty());
        assert_eq!(s.stats().btb_misses, 2);
        assert_eq!(s.stats().static_bp.hits, 2);
    }

    #[test]
    fn always_fill_caches_not_taken_branches() {
        let cfg = SimConfig::new(4).unwrap()
            .with_mode(PredictorMode::Static)
            .with_fill(FillPolicy::Always);
        let mut s = Simulator::from_config(&cfg);
        s.run(&[not_taken(0x10, 0x20), not_taken(0x10, 0x20)]);
        assert_eq!(s.btb().peek(0x10), Some(0x20));
        assert_eq!(s.stats().btb_hits, 1);
        // The line is present, so cache presence now predicts 'taken'.
        assert_eq!(s.stats().static_bp.misses, 1);
        assert_eq!(s.stats().btb_hit_mispredicted, 1);
    }

    #[test]
    fn measures_before_updating() {
        let cfg = SimConfig::new(4).unwrap()
            .with_initial_state(CounterState::WeaklyNotTaken);
        let mut s = Simulator::from_config(&cfg);
        s.step(&taken(0x10, 0x4));
        assert_eq!(s.stats().btb_misses, 1);
        assert_eq!(s.stats().dynamic_bp, Some(PolicyStats { hits: 0, misses: 1 }));
        assert_eq!(s.counters().unwrap().state(0x10), CounterState::WeaklyTaken);

        s.step(&taken(0x10, 0x4));
        assert_eq!(s.stats().btb_hits, 1);
        assert_eq!(s.stats().dynamic_bp, Some(PolicyStats { hits: 1, misses: 1 }));
    }

    #[test]
    fn hit_but_mispredicted_follows_active_predictor() {
        // Taken once (filled), then not-taken: the BTB hits on the second
        // record while both predictors say 'taken'.
        let mut s = sim(4, PredictorMode::Dynamic);
        s.run(&[taken(0x10, 0x4), not_taken(0x10, 0x4)]);
        assert_eq!(s.stats().btb_hits, 1);
        assert_eq!(s.stats().btb_hit_mispredicted, 1);

        // Static mode: cache presence also mispredicts the second record.
        let mut s = sim(4, PredictorMode::Static);
        s.run(&[taken(0x10, 0x4), not_taken(0x10, 0x4)]);
        assert_eq!(s.stats().btb_hit_mispredicted, 1);
    }

    #[test]
    fn compound_counter_ignores_btb_misses() {
        let cfg = SimConfig::new(4).unwrap()
            .with_initial_state(CounterState::StronglyNotTaken);
        let mut s = Simulator::from_config(&cfg);
        s.run(&[taken(0x10, 0x4), taken(0x20, 0x4)]);
        assert_eq!(s.stats().dynamic_bp.map(|p| p.misses), Some(2));
        assert_eq!(s.stats().btb_hit_mispredicted, 0);
    }

    #[test]
    fn counts_evictions() {
        let mut s = sim(1, PredictorMode::Static);
        s.run(&[taken(0x10, 0x4), taken(0x20, 0x4), taken(0x10, 0x4)]);
        assert_eq!(s.stats().btb_evictions, 2);
        assert_eq!(s.stats().btb_hits, 0);
    }

    #[test]
    fn returns_fill_with_no_target() {
        let mut s = sim(2, PredictorMode::Dynamic);
        s.run(&[BranchRecord::ret(0x30, Outcome::T)]);
        assert_eq!(s.predict_target(0x30), Some(BranchRecord::NO_TARGET));
    }

    fn random_trace(seed: u64) -> Vec<BranchRecord> {
        let mut synth = TraceSynthesizer::new(seed);
        synth.add_branch(0x1000, 0x0f00, BranchPattern::TakenPeriodic(4));
        synth.add_branch(0x1010, 0x2000, BranchPattern::Random(0.3));
        synth.add_branch(0x1020, 0x1000, BranchPattern::AlwaysTaken);
        synth.add_branch(0x1030, 0x1100, BranchPattern::NeverTaken);
        synth.add_return(0x1040, BranchPattern::Random(0.9));
        synth.add_branch(0x1050, 0x0900, BranchPattern::NotTakenPeriodic(3));
        synth.generate(2000)
    }

    #[test]
    fn hits_plus_misses_is_total() {
        for (seed, capacity) in [(1, 1), (2, 3), (3, 16)] {
            let trace = random_trace(seed);
            let mut s = sim(capacity, PredictorMode::Dynamic);
            s.run(&trace);
            let st = s.stats();
            assert_eq!(st.total, trace.len());
            assert_eq!(st.btb_hits + st.btb_misses, st.total);
            assert_eq!(st.static_bp.total(), st.total);
            assert_eq!(st.dynamic_bp.map(|p| p.total()), Some(st.total));
            assert!(st.btb_hit_mispredicted <= st.btb_hits);
        }
    }

    #[test]
    fn replay_is_deterministic() {
        let trace = random_trace(7);
        let cfg = SimConfig::new(3).unwrap();
        let mut first = Simulator::from_config(&cfg);
        let mut second = Simulator::from_config(&cfg);
        first.run(&trace);
        second.run(&trace);
        assert_eq!(first.stats(), second.stats());
        assert_eq!(first.report(), second.report());
    }

    #[test]
    fn dynamic_beats_static_on_a_loop() {
        // A loop back-edge taken 7 times out of 8, with a tiny BTB shared
        // with a second, always-taken branch.
        let mut synth = TraceSynthesizer::new(0);
        synth.add_branch(0x400, 0x100, BranchPattern::NotTakenPeriodic(8));
        synth.add_branch(0x500, 0x900, BranchPattern::AlwaysTaken);
        let trace = synth.generate(800);

        let mut s = sim(1, PredictorMode::Dynamic);
        s.run(&trace);
        let report = s.report();
        assert!(report.improvement.unwrap() > 0.0);
    }
}
