//! Python bindings for the warp simulator using PyO3

use crate::config::SimRequest;
use crate::simulation::run_and_aggregate;
use crate::stats::SimulationSummary;
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn summary_to_dict<'py>(py: Python<'py>, summary: &SimulationSummary) -> PyResult<Bound<'py, PyDict>> {
    let result_dict = PyDict::new(py);
    result_dict.set_item("success_probability", summary.success_probability)?;
    result_dict.set_item(
        "avg_exchange_tickets_among_successes",
        summary.avg_exchange_tickets_among_successes,
    )?;

    let distribution = PyDict::new(py);
    for (label, row) in &summary.pulls_distribution {
        let entry = PyDict::new(py);
        entry.set_item("pulls", row.pulls)?;
        entry.set_item("currency_consumed", row.currency_consumed)?;
        entry.set_item("tickets_earned", row.tickets_earned)?;
        distribution.set_item(label, entry)?;
    }
    result_dict.set_item("pulls_distribution", distribution)?;
    result_dict.set_item("simulations", summary.simulations)?;
    result_dict.set_item("completed_unbounded", summary.completed_unbounded)?;
    Ok(result_dict)
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

fn run_to_json(py: Python<'_>, request: &SimRequest, parallel: bool) -> PyResult<String> {
    // Release GIL during computation
    match py.allow_threads(|| run_and_aggregate(request, parallel)) {
        Ok(summary) => serde_json::to_string(&summary).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("Failed to serialize results: {}", e))
        }),
        Err(e) => Ok(error_json(e)),
    }
}

/// Python-callable simulation function - accepts individual keyword arguments.
/// A rejected request comes back as `{"error": message}`.
#[pyfunction]
#[pyo3(signature = (
    target_pickup_characters=0,
    target_pickup_light_cones=0,
    initial_currency=0,
    initial_tickets=0,
    initial_pity5=0,
    initial_guaranteed_pickup=false,
    num_simulations=10_000,
    seed=None,
    parallel=true
))]
#[allow(clippy::too_many_arguments)]
fn simulate(
    py: Python<'_>,
    target_pickup_characters: u32,
    target_pickup_light_cones: u32,
    initial_currency: u64,
    initial_tickets: u64,
    initial_pity5: u32,
    initial_guaranteed_pickup: bool,
    num_simulations: usize,
    seed: Option<u64>,
    parallel: bool,
) -> PyResult<PyObject> {
    let request = SimRequest {
        target_pickup_characters,
        target_pickup_light_cones,
        initial_currency,
        initial_tickets,
        initial_pity5,
        initial_guaranteed_pickup,
        num_simulations,
        seed,
        threads: None,
    };

    match py.allow_threads(|| run_and_aggregate(&request, parallel)) {
        Ok(summary) => Ok(summary_to_dict(py, &summary)?.into_any().unbind()),
        Err(e) => {
            let result_dict = PyDict::new(py);
            result_dict.set_item("error", e.to_string())?;
            Ok(result_dict.into_any().unbind())
        }
    }
}

/// Python-callable simulation function from a JSON request string
#[pyfunction]
#[pyo3(signature = (request_json, parallel=true))]
fn simulate_json(py: Python<'_>, request_json: &str, parallel: bool) -> PyResult<String> {
    let request = SimRequest::from_json(request_json).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid request JSON: {}", e))
    })?;
    run_to_json(py, &request, parallel)
}

/// Python-callable simulation function from a YAML/JSON request file
#[pyfunction]
#[pyo3(signature = (request_path, parallel=true))]
fn simulate_from_file(py: Python<'_>, request_path: &str, parallel: bool) -> PyResult<String> {
    let request = SimRequest::from_file(request_path).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("Failed to load request: {}", e))
    })?;
    run_to_json(py, &request, parallel)
}

/// Get number of threads being used for parallel simulation
#[pyfunction]
fn get_thread_count() -> PyResult<usize> {
    Ok(rayon::current_num_threads())
}

/// Get number of available CPU cores
#[pyfunction]
fn get_available_cores() -> PyResult<usize> {
    Ok(num_cpus::get())
}

/// Python module definition
#[pymodule]
fn warp_sim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_json, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_from_file, m)?)?;
    m.add_function(wrap_pyfunction!(get_thread_count, m)?)?;
    m.add_function(wrap_pyfunction!(get_available_cores, m)?)?;
    Ok(())
}
