//! Aggregation of trial results into the simulation summary

use crate::trial::{TrialEnd, TrialResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reported percentiles of the unbounded pull-count distribution
pub const PERCENTILES: [(f64, &str); 4] = [(25.0, "25%"), (50.0, "50%"), (75.0, "75%"), (99.0, "99%")];

/// Budgeted and unbounded results of one simulation index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialPair {
    pub budgeted: TrialResult,
    pub unbounded: TrialResult,
}

/// One row of the pull distribution.
///
/// `pulls` is interpolated; `currency_consumed` and `tickets_earned` are
/// copied from the recorded trial whose pull count is closest to it, so they
/// are approximate by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileRow {
    pub pulls: f64,
    pub currency_consumed: f64,
    pub tickets_earned: f64,
}

/// Aggregated results of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub simulations: usize,
    /// Share of budgeted trials that met the goal, in percent
    pub success_probability: f64,
    pub avg_exchange_tickets_among_successes: f64,
    /// Empty when no unbounded trial met the goal before the cap
    pub pulls_distribution: BTreeMap<String, PercentileRow>,
    pub completed_unbounded: usize,
    pub capped_budgeted: usize,
    pub capped_unbounded: usize,
}

impl SimulationSummary {
    pub fn from_results(pairs: &[TrialPair]) -> Self {
        let simulations = pairs.len();

        let success_tickets: Vec<u32> = pairs
            .iter()
            .filter(|p| p.budgeted.succeeded())
            .map(|p| p.budgeted.exchange_tickets)
            .collect();
        let success_probability = if simulations > 0 {
            success_tickets.len() as f64 / simulations as f64 * 100.0
        } else {
            0.0
        };
        let avg_exchange_tickets_among_successes = if success_tickets.is_empty() {
            0.0
        } else {
            success_tickets.iter().map(|&t| t as f64).sum::<f64>() / success_tickets.len() as f64
        };

        // Recording order is kept: nearest-sample ties go to the earliest trial
        let completed: Vec<TrialResult> = pairs
            .iter()
            .map(|p| p.unbounded)
            .filter(|r| r.succeeded())
            .collect();

        let capped_budgeted = pairs.iter().filter(|p| p.budgeted.end == TrialEnd::Capped).count();
        let capped_unbounded = pairs.iter().filter(|p| p.unbounded.end == TrialEnd::Capped).count();

        Self {
            simulations,
            success_probability,
            avg_exchange_tickets_among_successes,
            pulls_distribution: pulls_distribution(&completed),
            completed_unbounded: completed.len(),
            capped_budgeted,
            capped_unbounded,
        }
    }
}

/// Percentile table over completed unbounded trials
pub fn pulls_distribution(samples: &[TrialResult]) -> BTreeMap<String, PercentileRow> {
    let mut table = BTreeMap::new();
    if samples.is_empty() {
        return table;
    }

    let mut sorted: Vec<f64> = samples.iter().map(|r| r.pulls as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    for (p, label) in PERCENTILES {
        let pulls = percentile(&sorted, p);
        if let Some(nearest) = nearest_sample(samples, pulls) {
            table.insert(
                label.to_string(),
                PercentileRow {
                    pulls,
                    currency_consumed: nearest.currency_consumed as f64,
                    tickets_earned: nearest.exchange_tickets as f64,
                },
            );
        }
    }
    table
}

/// Linear-interpolated percentile of ascending `sorted` (`p` in 0..=100)
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (n - 1) as f64 * (p / 100.0).clamp(0.0, 1.0);
            let lo = rank.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// First sample whose pull count is closest to `pulls`
pub fn nearest_sample(samples: &[TrialResult], pulls: f64) -> Option<&TrialResult> {
    samples
        .iter()
        .min_by(|a, b| {
            let da = (a.pulls as f64 - pulls).abs();
            let db = (b.pulls as f64 - pulls).abs();
            da.total_cmp(&db)
        })
}
