use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub scenario_path: Option<PathBuf>,
    pub log_level: String,
    pub pretty: bool,
}

impl SimulatorConfig {
    /// First CLI argument wins over `SCENARIO_PATH`
    pub fn from_env(mut args: impl Iterator<Item = String>) -> Self {
        let scenario_path = args
            .next()
            .or_else(|| std::env::var("SCENARIO_PATH").ok())
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let pretty = std::env::var("SIMULATOR_PRETTY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            scenario_path,
            log_level,
            pretty,
        }
    }
}
