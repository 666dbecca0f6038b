//! Implementation of a 2-bit saturating counter.

use crate::Outcome;
use serde::{Deserialize, Serialize};

/// The four levels of a 2-bit saturating counter, in increasing order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CounterState {
    StronglyNotTaken,
    WeaklyNotTaken,
    #[default]
    WeaklyTaken,
    StronglyTaken,
}

impl CounterState {
    /// Move one step toward [`CounterState::StronglyTaken`].
    pub fn strengthen(self) -> Self {
        match self {
            Self::StronglyNotTaken => Self::WeaklyNotTaken,
            Self::WeaklyNotTaken => Self::WeaklyTaken,
            Self::WeaklyTaken | Self::StronglyTaken => Self::StronglyTaken,
        }
    }

    /// Move one step toward [`CounterState::StronglyNotTaken`].
    pub fn weaken(self) -> Self {
        match self {
            Self::StronglyNotTaken | Self::WeaklyNotTaken => Self::StronglyNotTaken,
            Self::WeaklyTaken => Self::WeaklyNotTaken,
            Self::StronglyTaken => Self::WeaklyTaken,
        }
    }

    /// Return the predicted direction.
    pub fn predict(self) -> Outcome {
        Outcome::from(self >= Self::WeaklyTaken)
    }

    /// Update the state of the counter with a resolved outcome.
    pub fn update(&mut self, outcome: Outcome) {
        *self = match outcome {
            Outcome::T => self.strengthen(),
            Outcome::N => self.weaken(),
        };
    }
}
