//! A per-address 2-bit saturating counter predictor.

use crate::{BranchRecord, Outcome};
use crate::predictor::*;

/// Predicts each branch from the [`CounterState`] its address maps to.
#[derive(Clone, Debug)]
pub struct TwoBitPredictor {
    table: CounterTable,
}
impl TwoBitPredictor {
    pub fn new(table: CounterTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CounterTable { &self.table }
}

impl DirectionPredictor for TwoBitPredictor {
    fn name(&self) -> &'static str { "Two-bit counter" }

    fn predict(&self, record: &BranchRecord, _btb: &TargetCache) -> Outcome {
        self.table.predict(record.pc)
    }

    fn update(&mut self, record: &BranchRecord) {
        self.table.update(record.pc, record.outcome);
    }
}
