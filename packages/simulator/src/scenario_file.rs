use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pix_algo::{AlgoError, Challenge, FlashAssessmentAlgorithmConfiguration, ScenarioOptions, ScenarioReport};

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scenario file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Algo(#[from] AlgoError),
    #[error("no scenario file given (pass a path or set SCENARIO_PATH)")]
    MissingScenarioPath,
}

/// Scenario description read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFile {
    #[serde(default)]
    pub configuration: FlashAssessmentAlgorithmConfiguration,
    pub challenges: Vec<Challenge>,
    pub scenario: ScenarioOptions,
    /// When set, one capacity-driven run per value replaces the scenario's answer picker
    #[serde(default)]
    pub capacities: Vec<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, SimulatorError> {
        let content = std::fs::read_to_string(path)?;
        let file: ScenarioFile = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            challenges = file.challenges.len(),
            capacities = file.capacities.len(),
            "scenario file loaded"
        );
        Ok(file)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SimulationOutput {
    Single(ScenarioReport),
    Batch(Vec<ScenarioReport>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "challenges": [{{"id": "rec1", "skillId": "s1", "discriminant": 1.2, "difficulty": 0.3}}],
                "scenario": {{"answerStatusPicker": {{"type": "random", "seed": 1}}}}
            }}"#
        )
        .unwrap();

        let scenario = ScenarioFile::load(file.path()).unwrap();
        assert_eq!(scenario.challenges.len(), 1);
        assert_eq!(scenario.configuration, FlashAssessmentAlgorithmConfiguration::default());
        assert!(scenario.capacities.is_empty());
        assert_eq!(scenario.scenario.stop_at_challenge, None);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ScenarioFile::load(file.path()),
            Err(SimulatorError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ScenarioFile::load(&dir.path().join("absent.json")),
            Err(SimulatorError::Io(_))
        ));
    }
}
