//! Flash algorithm
//!
//! IRT-based adaptive selection used by certification and flash campaigns.
//!
//! - [`estimator`] - EAP capacity estimation
//! - [`reward`] - Fisher information of an item
//! - [`success_rate`] - minimal success rate per question index
//! - [`rules`] - challenge selection rules and their engine
//! - [`selection`] - pluggable selection implementations
//! - [`algorithm`] - the orchestrator

pub mod algorithm;
pub mod config;
pub mod estimator;
pub mod reward;
pub mod rules;
pub mod selection;
pub mod success_rate;

pub use algorithm::{FlashAssessmentAlgorithm, NextChallengeRequest};
pub use config::FlashAssessmentAlgorithmConfiguration;
pub use estimator::{CapacityEstimator, EstimationOptions};
pub use reward::{probability_of_success, reward};
pub use rules::{
    ChallengeSelectionRule, ForcedCompetencesRule, NonAnsweredSkillsRule, OneQuestionPerTubeRule,
    PassageByAllCompetencesRule, RuleContext, RuleEngine,
};
pub use selection::{
    FlashAlgorithmImplementation, FlashSelection, PossibleChallenges, SelectionOptions,
    SelectionRequest,
};
pub use success_rate::{default_success_rate_ranges, SuccessRatePolicy, SuccessRateRange};
