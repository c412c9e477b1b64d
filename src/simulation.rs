//! Batch runner - independent budgeted/unbounded trial pairs

use crate::config::SimRequest;
use crate::error::SimError;
use crate::rng::{trial_seed, FastRng, Stream};
use crate::stats::{SimulationSummary, TrialPair};
use crate::trial::{run_budgeted, run_unbounded};
use log::{debug, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked once per trial pair
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Run trial pair `index` with its own two random streams
pub fn run_trial_pair(request: &SimRequest, base_seed: u64, index: usize) -> TrialPair {
    let mut rng = FastRng::new(trial_seed(base_seed, index as u64, Stream::Budgeted));
    let budgeted = run_budgeted(request, &mut rng);

    let mut rng = FastRng::new(trial_seed(base_seed, index as u64, Stream::Unbounded));
    let unbounded = run_unbounded(request, &mut rng);

    TrialPair { budgeted, unbounded }
}

/// Worker count for parallel runs: the request's override, else ~70% of cores
fn worker_threads(requested: Option<usize>) -> usize {
    requested.filter(|&n| n > 0).unwrap_or_else(|| {
        let num_cores = num_cpus::get();
        ((num_cores as f64 * 0.70).round() as usize)
            .max(2)
            .min(num_cores.saturating_sub(1).max(1))
    })
}

/// Run all trial pairs in parallel. Skipped pairs (after cancellation) are `None`.
pub fn run_simulations_parallel(
    request: &SimRequest,
    base_seed: u64,
    cancel: &CancelToken,
) -> Vec<Option<TrialPair>> {
    let count = request.num_simulations;
    let threads = worker_threads(request.threads);

    let job = || {
        let chunk_size = (count / threads).max(1);
        (0..count)
            .into_par_iter()
            .with_min_len(chunk_size.min(100))
            .map(|i| {
                if cancel.is_cancelled() {
                    None
                } else {
                    Some(run_trial_pair(request, base_seed, i))
                }
            })
            .collect::<Vec<_>>()
    };

    match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(job),
        Err(e) => {
            warn!("could not build a {}-thread pool ({}), using the global pool", threads, e);
            job()
        }
    }
}

/// Run all trial pairs on the calling thread, stopping at cancellation
pub fn run_simulations_sequential(
    request: &SimRequest,
    base_seed: u64,
    cancel: &CancelToken,
) -> Vec<Option<TrialPair>> {
    let mut results = Vec::with_capacity(request.num_simulations);
    for i in 0..request.num_simulations {
        if cancel.is_cancelled() {
            break;
        }
        results.push(Some(run_trial_pair(request, base_seed, i)));
    }
    results.resize(request.num_simulations, None);
    results
}

/// Validate, run and aggregate a request
pub fn run_and_aggregate(request: &SimRequest, parallel: bool) -> Result<SimulationSummary, SimError> {
    run_and_aggregate_with_cancel(request, parallel, &CancelToken::new())
}

pub fn run_and_aggregate_with_cancel(
    request: &SimRequest,
    parallel: bool,
    cancel: &CancelToken,
) -> Result<SimulationSummary, SimError> {
    request.validate()?;

    let base_seed = request.seed.unwrap_or_else(rand::random::<u64>);
    debug!(
        "running {} trial pairs (seed {}, parallel {})",
        request.num_simulations, base_seed, parallel
    );

    let results = if parallel {
        run_simulations_parallel(request, base_seed, cancel)
    } else {
        run_simulations_sequential(request, base_seed, cancel)
    };

    let pairs: Vec<TrialPair> = results.iter().flatten().copied().collect();
    if pairs.len() < results.len() {
        warn!("cancelled after {} of {} trial pairs", pairs.len(), results.len());
        return Err(SimError::Cancelled { completed: pairs.len() });
    }

    let summary = SimulationSummary::from_results(&pairs);
    if summary.capped_budgeted > 0 || summary.capped_unbounded > 0 {
        warn!(
            "{} budgeted and {} unbounded trials hit the iteration cap and were left out",
            summary.capped_budgeted, summary.capped_unbounded
        );
    }
    debug!(
        "success {:.2}%, {} unbounded trials completed",
        summary.success_probability, summary.completed_unbounded
    );
    Ok(summary)
}
