//! Implementation of a pattern history table (PHT).

use std::num::NonZeroUsize;
use crate::Outcome;
use crate::predictor::*;

/// A table of [`CounterState`] indexed by the program counter.
///
/// The index is `pc mod size`, so distinct branches may share a counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterTable {
    /// Table of counters
    data: Vec<CounterState>,

    /// State of every counter after construction or [`CounterTable::reset`]
    init: CounterState,
}
impl CounterTable {
    pub fn new(size: NonZeroUsize, init: CounterState) -> Self {
        Self {
            data: vec![init; size.get()],
            init,
        }
    }

    /// The state every counter started from.
    pub fn initial_state(&self) -> CounterState { self.init }

    /// Return the counter state used for `pc`.
    pub fn state(&self, pc: u32) -> CounterState {
        *self.get_entry(self.get_index(pc))
    }

    /// Return the predicted direction for `pc`.
    pub fn predict(&self, pc: u32) -> Outcome {
        self.state(pc).predict()
    }

    /// Move the counter for `pc` one step toward `outcome`.
    pub fn update(&mut self, pc: u32, outcome: Outcome) {
        let idx = self.get_index(pc);
        self.get_entry_mut(idx).update(outcome);
    }

    /// Reset every counter to the initial state.
    pub fn reset(&mut self) {
        self.data.fill(self.init);
    }
}

impl PredictorTable for CounterTable {
    type Input = u32;
    type Entry = CounterState;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, pc: u32) -> usize {
        pc as usize % self.data.len()
    }

    fn get_entry(&self, idx: usize) -> &CounterState {
        &self.data[idx]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut CounterState {
        &mut self.data[idx]
    }
}
