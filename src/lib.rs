//! Replay branch traces against a branch target buffer and direction
//! predictors.

pub mod branch;
pub mod config;
pub mod error;
pub mod predictor;
pub mod report;
pub mod sim;
pub mod stats;
pub mod sweep;
pub mod trace;

pub use branch::*;
pub use config::SimConfig;
pub use predictor::*;
pub use report::StatisticsReport;
pub use sim::Simulator;
pub use sweep::SweepReport;
pub use trace::*;
