use serde::{Deserialize, Serialize};

use crate::error::AlgoError;
use crate::flash::estimator::EstimationOptions;
use crate::flash::success_rate::{default_success_rate_ranges, SuccessRateRange};

pub const DEFAULT_MAXIMUM_ASSESSMENT_LENGTH: usize = 32;

/// Session-wide settings of the flash algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlashAssessmentAlgorithmConfiguration {
    pub warm_up_length: usize,
    pub forced_competences: Vec<String>,
    pub maximum_assessment_length: usize,
    pub challenges_between_same_competence: usize,
    pub minimum_estimated_success_rate_ranges: Vec<SuccessRateRange>,
    pub limit_to_one_question_per_tube: bool,
    pub enable_passage_by_all_competences: bool,
    pub double_measures_until: usize,
    pub variation_percent: Option<f64>,
    pub variation_percent_until: Option<usize>,
}

impl Default for FlashAssessmentAlgorithmConfiguration {
    fn default() -> Self {
        Self {
            warm_up_length: 0,
            forced_competences: Vec::new(),
            maximum_assessment_length: DEFAULT_MAXIMUM_ASSESSMENT_LENGTH,
            challenges_between_same_competence: 0,
            minimum_estimated_success_rate_ranges: default_success_rate_ranges(),
            limit_to_one_question_per_tube: false,
            enable_passage_by_all_competences: false,
            double_measures_until: 0,
            variation_percent: None,
            variation_percent_until: None,
        }
    }
}

impl FlashAssessmentAlgorithmConfiguration {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_parse("FLASH_WARM_UP_LENGTH") {
            config.warm_up_length = val;
        }
        if let Ok(val) = std::env::var("FLASH_FORCED_COMPETENCES") {
            config.forced_competences = val
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(val) = env_parse("FLASH_MAXIMUM_ASSESSMENT_LENGTH") {
            config.maximum_assessment_length = val;
        }
        if let Some(val) = env_parse("FLASH_CHALLENGES_BETWEEN_SAME_COMPETENCE") {
            config.challenges_between_same_competence = val;
        }
        if let Some(val) = env_parse("FLASH_LIMIT_TO_ONE_QUESTION_PER_TUBE") {
            config.limit_to_one_question_per_tube = val;
        }
        if let Some(val) = env_parse("FLASH_ENABLE_PASSAGE_BY_ALL_COMPETENCES") {
            config.enable_passage_by_all_competences = val;
        }
        if let Some(val) = env_parse("FLASH_DOUBLE_MEASURES_UNTIL") {
            config.double_measures_until = val;
        }
        if let Some(val) = env_parse("FLASH_VARIATION_PERCENT") {
            config.variation_percent = Some(val);
        }
        if let Some(val) = env_parse("FLASH_VARIATION_PERCENT_UNTIL") {
            config.variation_percent_until = Some(val);
        }

        config
    }

    pub fn validate(&self) -> Result<(), AlgoError> {
        for range in &self.minimum_estimated_success_rate_ranges {
            range.validate()?;
        }
        if let Some(percent) = self.variation_percent {
            if !percent.is_finite() || percent <= 0.0 {
                return Err(AlgoError::InvalidConfiguration(format!(
                    "variationPercent must be a positive number, got {percent}"
                )));
            }
        }
        if self.forced_competences.iter().any(|id| id.is_empty()) {
            return Err(AlgoError::InvalidConfiguration(
                "forcedCompetences contains an empty identifier".to_string(),
            ));
        }
        Ok(())
    }

    pub fn estimation_options(&self) -> EstimationOptions {
        EstimationOptions {
            double_measures_until: self.double_measures_until,
            variation_percent: self.variation_percent,
            variation_percent_until: self.variation_percent_until,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.trim().parse().ok())
}
