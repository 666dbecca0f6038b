//! Configuration for a replay.
//!
//! Capacities are validated here, before any [`TargetCache`] or
//! [`CounterTable`] is built, so the rest of the crate can rely on them being
//! non-zero.
//!
//! [`TargetCache`]: crate::predictor::TargetCache
//! [`CounterTable`]: crate::predictor::CounterTable

use std::num::NonZeroUsize;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::predictor::{CounterState, StaticRule};

/// Default values for a [`SimConfig`].
pub mod defaults {
    use super::*;

    /// Counters start out predicting 'taken'.
    pub const INITIAL_STATE: CounterState = CounterState::WeaklyTaken;
    pub const MODE: PredictorMode = PredictorMode::Dynamic;
    pub const STATIC_RULE: StaticRule = StaticRule::CachePresence;
    pub const FILL: FillPolicy = FillPolicy::TakenOnly;
}

/// Which direction predictors take part in a replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PredictorMode {
    /// Only the static predictor runs.
    Static,
    /// The two-bit predictor runs, with the static predictor alongside it
    /// for comparison.
    #[default]
    Dynamic,
}

/// When a resolved branch is written into the target cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FillPolicy {
    /// Only taken branches are cached.
    #[default]
    TakenOnly,
    /// Every resolved branch is cached.
    Always,
}
impl FillPolicy {
    pub fn should_fill(&self, taken: bool) -> bool {
        match self {
            Self::TakenOnly => taken,
            Self::Always => true,
        }
    }
}

/// Parameters for one replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of lines in the target cache
    pub btb_capacity: NonZeroUsize,

    /// Number of counters in the two-bit predictor's table
    pub pht_size: NonZeroUsize,

    /// State of every counter at the start of a replay
    pub initial_state: CounterState,

    pub mode: PredictorMode,

    /// Rule used by the static predictor
    pub static_rule: StaticRule,

    /// Rule for filling the target cache
    pub fill: FillPolicy,
}

impl SimConfig {
    /// Create a configuration with the given BTB capacity and defaults for
    /// everything else. The counter table gets one entry per BTB line.
    pub fn new(btb_capacity: usize) -> Result<Self, ConfigError> {
        let btb_capacity = NonZeroUsize::new(btb_capacity)
            .ok_or(ConfigError::ZeroCapacity)?;
        Ok(Self {
            btb_capacity,
            pht_size: btb_capacity,
            initial_state: defaults::INITIAL_STATE,
            mode: defaults::MODE,
            static_rule: defaults::STATIC_RULE,
            fill: defaults::FILL,
        })
    }

    /// Change the BTB capacity, keeping every other field.
    pub fn with_btb_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        self.btb_capacity = NonZeroUsize::new(capacity).ok_or(ConfigError::ZeroCapacity)?;
        Ok(self)
    }

    pub fn with_pht_size(mut self, size: usize) -> Result<Self, ConfigError> {
        self.pht_size = NonZeroUsize::new(size).ok_or(ConfigError::ZeroTableSize)?;
        Ok(self)
    }

    pub fn with_initial_state(mut self, state: CounterState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_mode(mut self, mode: PredictorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_static_rule(mut self, rule: StaticRule) -> Self {
        self.static_rule = rule;
        self
    }

    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }
}
