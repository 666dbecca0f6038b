
use serde::{Deserialize, Serialize};
use crate::{BranchRecord, Direction, Outcome};
use crate::predictor::{DirectionPredictor, TargetCache};

/// Rules available to [`StaticPredictor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StaticRule {
    /// Predict 'taken' when the branch has a target cached in the BTB.
    #[default]
    CachePresence,
    /// Predict 'taken' for backward branches only.
    BackwardTaken,
}

/// A predictor with no state of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPredictor {
    rule: StaticRule,
}
impl StaticPredictor {
    pub fn new(rule: StaticRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> StaticRule { self.rule }
}

impl DirectionPredictor for StaticPredictor {
    fn name(&self) -> &'static str {
        match self.rule {
            StaticRule::CachePresence => "Static (cache presence)",
            StaticRule::BackwardTaken => "Static (backward taken)",
        }
    }

    fn predict(&self, record: &BranchRecord, btb: &TargetCache) -> Outcome {
        match self.rule {
            StaticRule::CachePresence => btb.contains(record.pc).into(),
            StaticRule::BackwardTaken => (record.hint == Direction::Backward).into(),
        }
    }
}
