use std::process::ExitCode;

use pix_scenario_simulator::config::SimulatorConfig;
use pix_scenario_simulator::logging::init_tracing;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = SimulatorConfig::from_env(std::env::args().skip(1));
    let _log_guard = init_tracing(&config.log_level);

    match pix_scenario_simulator::run(&config) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
