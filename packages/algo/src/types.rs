//! Common Types and Constants
//!
//! Shared data structures used across the flash algorithm, the smart-random
//! selector and the scenario simulator.

use serde::{Deserialize, Serialize};

use crate::sanitize::{sanitize_irt_params, IrtParams};

// ==================== Constants ====================

/// Capacity used when no answer has been given yet
pub const DEFAULT_CAPACITY: f64 = 0.0;

/// Error rate reported before the first answer
pub const DEFAULT_ERROR_RATE: f64 = 5.0;

/// Upper bound on the candidates returned by the flash selection
pub const MAX_NUMBER_OF_RETURNED_CHALLENGES: usize = 5;

/// Logit clamp for success probabilities
pub const MAX_LOGIT: f64 = 20.0;

// ==================== Challenge Types ====================

/// Lifecycle status of a challenge in the learning content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    #[default]
    Validated,
    Archived,
    Proposed,
    Obsolete,
}

impl ChallengeStatus {
    /// Validated or archived: answers on it still count
    pub fn is_operative(&self) -> bool {
        matches!(self, ChallengeStatus::Validated | ChallengeStatus::Archived)
    }

    /// Only validated challenges are presented to new test-takers
    pub fn is_selectable(&self) -> bool {
        matches!(self, ChallengeStatus::Validated)
    }
}

/// An item of the assessment pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub skill_id: String,
    #[serde(default)]
    pub tube_id: String,
    #[serde(default)]
    pub competence_id: String,
    #[serde(default)]
    pub discriminant: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub status: ChallengeStatus,
    /// Time limit in seconds for timed challenges
    #[serde(default)]
    pub timer: Option<u32>,
}

impl Challenge {
    /// Validated IRT parameters, `None` when missing or degenerate
    pub fn irt_params(&self) -> Option<IrtParams> {
        sanitize_irt_params(self.discriminant, self.difficulty)
    }

    pub fn is_timed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_playable_in(&self, locale: &str) -> bool {
        self.status.is_selectable()
            && self
                .locales
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(locale))
    }
}

// ==================== Answer Types ====================

/// Result recorded for an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "ko")]
    Ko,
    #[serde(rename = "aband")]
    Skipped,
    #[serde(rename = "timedout")]
    TimedOut,
    #[serde(rename = "focusedOut")]
    FocusedOut,
    #[serde(rename = "partially")]
    Partially,
    #[serde(rename = "unimplemented")]
    Unimplemented,
}

impl AnswerStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, AnswerStatus::Ok)
    }
}

/// A submitted answer; the history is append-only and ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub id: Option<String>,
    pub challenge_id: String,
    pub result: AnswerStatus,
    /// Set when the answered challenge was timed
    #[serde(default)]
    pub timeout: Option<i32>,
}

impl Answer {
    pub fn new(challenge_id: impl Into<String>, result: AnswerStatus) -> Self {
        Self {
            id: None,
            challenge_id: challenge_id.into(),
            result,
            timeout: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

// ==================== Estimation Types ====================

/// Ability estimate recomputed from the full answer history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityEstimate {
    pub estimated_level: f64,
    pub error_rate: f64,
}

/// Candidate challenge ranked by the selection implementation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChallenge<'a> {
    pub challenge: &'a Challenge,
    pub reward: f64,
    pub success_probability: f64,
}

// ==================== Smart-Random Types ====================

/// Skill targeted by a classic (non-flash) assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    /// Level of the skill inside its tube (1..=8)
    pub difficulty: u8,
    pub tube_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeElementStatus {
    Validated,
    Invalidated,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeElementSource {
    Direct,
    Inferred,
}

/// What is known about a learner on one skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeElement {
    pub skill_id: String,
    pub status: KnowledgeElementStatus,
    pub source: KnowledgeElementSource,
}

impl KnowledgeElement {
    pub fn is_validated(&self) -> bool {
        self.status == KnowledgeElementStatus::Validated
    }
}
