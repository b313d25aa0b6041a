use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an assessment stopped presenting challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndReason {
    MaximumLengthReached { answered: usize, maximum: usize },
    NoEligibleChallenges,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::MaximumLengthReached { answered, maximum } => {
                write!(f, "maximum length reached ({answered}/{maximum})")
            }
            EndReason::NoEligibleChallenges => write!(f, "no eligible challenge left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgoError {
    /// Normal terminal state, not a failure
    #[error("assessment ended: {0}")]
    AssessmentEnded(EndReason),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AlgoError {
    pub fn is_assessment_ended(&self) -> bool {
        matches!(self, AlgoError::AssessmentEnded(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            AlgoError::AssessmentEnded(reason) => Some(*reason),
            _ => None,
        }
    }
}
