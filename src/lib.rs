//! Monte Carlo odds for limited warp banners.
//!
//! Estimates the chance of reaching a number of pickup 5-stars with a given
//! currency and ticket budget, and the pull/currency distribution needed
//! when the budget is unlimited.
//!
//! Trials that cannot meet their goal within `ITERATION_CAP` iterations are
//! truncated and dropped from the success and percentile figures, so very
//! large targets quietly shrink the effective sample size
//! (`SimulationSummary::capped_*` reports how many).

pub mod config;
pub mod error;
pub mod fragments;
pub mod odds;
pub mod pull;
pub mod rng;
pub mod simulation;
pub mod stats;
pub mod trial;

#[cfg(feature = "python")]
mod python;

pub use config::{GachaKind, SimRequest};
pub use error::SimError;
pub use simulation::{run_and_aggregate, run_and_aggregate_with_cancel, CancelToken};
pub use stats::SimulationSummary;
