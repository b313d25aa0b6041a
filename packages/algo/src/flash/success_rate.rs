//! Minimal estimated success rate per question index.

use serde::{Deserialize, Serialize};

use crate::error::AlgoError;

/// One window of the success-rate table; indices are 0-based and inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SuccessRateRange {
    #[serde(rename_all = "camelCase")]
    Fixed {
        starting_challenge_index: usize,
        ending_challenge_index: usize,
        value: f64,
    },
    #[serde(rename_all = "camelCase")]
    Linear {
        starting_challenge_index: usize,
        ending_challenge_index: usize,
        starting_value: f64,
        ending_value: f64,
    },
}

impl SuccessRateRange {
    pub fn fixed(start: usize, end: usize, value: f64) -> Self {
        SuccessRateRange::Fixed {
            starting_challenge_index: start,
            ending_challenge_index: end,
            value,
        }
    }

    pub fn linear(start: usize, end: usize, starting_value: f64, ending_value: f64) -> Self {
        SuccessRateRange::Linear {
            starting_challenge_index: start,
            ending_challenge_index: end,
            starting_value,
            ending_value,
        }
    }

    fn bounds(&self) -> (usize, usize) {
        match *self {
            SuccessRateRange::Fixed {
                starting_challenge_index,
                ending_challenge_index,
                ..
            }
            | SuccessRateRange::Linear {
                starting_challenge_index,
                ending_challenge_index,
                ..
            } => (starting_challenge_index, ending_challenge_index),
        }
    }

    pub fn is_applicable(&self, question_index: usize) -> bool {
        let (start, end) = self.bounds();
        (start..=end).contains(&question_index)
    }

    pub fn minimal_success_rate(&self, question_index: usize) -> f64 {
        match *self {
            SuccessRateRange::Fixed { value, .. } => value,
            SuccessRateRange::Linear {
                starting_challenge_index,
                ending_challenge_index,
                starting_value,
                ending_value,
            } => {
                if ending_challenge_index <= starting_challenge_index {
                    return starting_value;
                }
                let span = (ending_challenge_index - starting_challenge_index) as f64;
                let position = question_index.saturating_sub(starting_challenge_index) as f64;
                starting_value + (ending_value - starting_value) * (position / span)
            }
        }
    }

    pub fn validate(&self) -> Result<(), AlgoError> {
        let (start, end) = self.bounds();
        if start > end {
            return Err(AlgoError::InvalidConfiguration(format!(
                "success rate range starts after it ends ({start} > {end})"
            )));
        }
        let values = match *self {
            SuccessRateRange::Fixed { value, .. } => [value, value],
            SuccessRateRange::Linear {
                starting_value,
                ending_value,
                ..
            } => [starting_value, ending_value],
        };
        if values.iter().any(|v| !v.is_finite() || !(0.0..=1.0).contains(v)) {
            return Err(AlgoError::InvalidConfiguration(format!(
                "success rate values must be within [0, 1] for range {start}..={end}"
            )));
        }
        Ok(())
    }
}

/// 0–7 fixed at 0.8, then 8–15 decreasing linearly to 0.5
pub fn default_success_rate_ranges() -> Vec<SuccessRateRange> {
    vec![
        SuccessRateRange::fixed(0, 7, 0.8),
        SuccessRateRange::linear(8, 15, 0.8, 0.5),
    ]
}

/// Ordered success-rate table; the first matching window wins
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuccessRatePolicy {
    ranges: Vec<SuccessRateRange>,
}

impl SuccessRatePolicy {
    pub fn new(ranges: Vec<SuccessRateRange>) -> Result<Self, AlgoError> {
        for range in &ranges {
            range.validate()?;
        }
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[SuccessRateRange] {
        &self.ranges
    }

    /// `0.0` when no window covers the index
    pub fn minimal_success_rate(&self, question_index: usize) -> f64 {
        self.ranges
            .iter()
            .find(|range| range.is_applicable(question_index))
            .map(|range| range.minimal_success_rate(question_index))
            .unwrap_or(0.0)
    }
}
