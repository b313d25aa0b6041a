//! Command-line scenario simulator for the flash assessment algorithm.

pub mod config;
pub mod logging;
pub mod scenario_file;

use pix_algo::{simulate, simulate_capacities, FlashAssessmentAlgorithm};

use crate::config::SimulatorConfig;
pub use crate::scenario_file::{ScenarioFile, SimulationOutput, SimulatorError};

pub fn run_scenario(file: &ScenarioFile) -> Result<SimulationOutput, SimulatorError> {
    let algorithm = FlashAssessmentAlgorithm::with_configuration(file.configuration.clone())?;

    if file.capacities.is_empty() {
        let report = simulate(&algorithm, &file.challenges, &file.scenario)?;
        return Ok(SimulationOutput::Single(report));
    }

    tracing::info!(runs = file.capacities.len(), "running capacity batch");
    let reports = simulate_capacities(
        &algorithm,
        &file.challenges,
        &file.capacities,
        &file.scenario,
        file.seed,
    )?;
    Ok(SimulationOutput::Batch(reports))
}

/// Loads the scenario, runs it and renders the report as JSON
pub fn run(config: &SimulatorConfig) -> Result<String, SimulatorError> {
    let path = config
        .scenario_path
        .as_deref()
        .ok_or(SimulatorError::MissingScenarioPath)?;
    let file = ScenarioFile::load(path)?;
    let output = run_scenario(&file)?;

    let rendered = if config.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(rendered)
}
