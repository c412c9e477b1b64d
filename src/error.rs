//! Errors surfaced by the simulation entry points

use crate::config::GachaKind;
use std::fmt;

/// Reasons a simulation request is rejected or a batch stops early.
///
/// None of these are raised mid-trial: a trial that cannot reach its goal is
/// truncated at the iteration cap and simply excluded from the statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Both target counts are zero, so no banner is active.
    NoTargets,
    /// `num_simulations` was zero.
    NoSimulations,
    /// Starting pity is at or beyond the hard-pity pull for its banner.
    PityOutOfRange { kind: GachaKind, pity: u32, max: u32 },
    /// The batch was cancelled after `completed` trial pairs.
    Cancelled { completed: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NoTargets => write!(f, "no target counts set: at least one pickup target must be non-zero"),
            SimError::NoSimulations => write!(f, "num_simulations must be positive"),
            SimError::PityOutOfRange { kind, pity, max } => write!(
                f,
                "initial 5-star pity {} is out of range for the {} banner (0..={})",
                pity,
                kind.label(),
                max
            ),
            SimError::Cancelled { completed } => {
                write!(f, "simulation cancelled after {} trials", completed)
            }
        }
    }
}

impl std::error::Error for SimError {}
