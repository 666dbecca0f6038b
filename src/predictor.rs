//! Implementations of different branch predictors.

pub mod table;
pub mod simple;
pub mod pht;
pub mod counter;
pub mod twobit;
pub mod btb;

pub use table::*;
pub use simple::*;
pub use pht::*;
pub use counter::*;
pub use twobit::*;
pub use btb::*;

use crate::{BranchRecord, Outcome};

/// Interface to a direction predictor.
///
/// A prediction is made against the state left behind by every earlier
/// record, and [`DirectionPredictor::update`] is only called once the
/// outcome of the record is known.
pub trait DirectionPredictor {
    fn name(&self) -> &'static str;

    /// Return the predicted outcome for a record.
    ///
    /// Predictors may consult (but never modify) the target cache.
    fn predict(&self, record: &BranchRecord, btb: &TargetCache) -> Outcome;

    /// Update the internal state of the predictor with the resolved record.
    fn update(&mut self, _record: &BranchRecord) {}
}
