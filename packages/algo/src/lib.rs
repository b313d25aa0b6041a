//! # pix-algo - adaptive assessment engine
//!
//! Pure Rust implementation of the Pix challenge selection algorithms:
//!
//! - **Flash** - IRT (2PL) capacity estimation with an EAP posterior, Fisher
//!   information rewards, a minimal success-rate policy and a rule engine
//! - **Smart random** - skill-level adaptive selection for classic campaigns
//! - **Scenario simulation** - offline replay of whole assessments
//!
//! ## Design
//!
//! - **Stateless** - every call recomputes from the full answer history
//! - **Degrading** - malformed content is skipped and logged, never raised
//! - **Shareable** - algorithms are `Send + Sync` and hold no session state
//!
//! ## Modules
//!
//! - [`flash`] - flash algorithm (estimator, reward, rules, selection, orchestrator)
//! - [`smart_random`] - classic adaptive selection
//! - [`scenario`] - assessment simulation
//! - [`sanitize`] - IRT parameter validation and numeric helpers
//! - [`error`] - error and end-of-assessment types
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use pix_algo::{Answer, Challenge, FlashAssessmentAlgorithm, NextChallengeRequest};
//!
//! let challenges = vec![Challenge {
//!     id: "rec1".to_string(),
//!     skill_id: "skill1".to_string(),
//!     tube_id: "tube1".to_string(),
//!     competence_id: "comp1".to_string(),
//!     discriminant: Some(1.2),
//!     difficulty: Some(0.5),
//!     locales: vec!["fr-fr".to_string()],
//!     status: Default::default(),
//!     timer: None,
//! }];
//! let algorithm = FlashAssessmentAlgorithm::with_configuration(Default::default()).unwrap();
//! let answers: Vec<Answer> = Vec::new();
//! let next = algorithm
//!     .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
//!     .unwrap();
//! assert_eq!(next[0].challenge.id, "rec1");
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod error;
pub mod flash;
pub mod sanitize;
pub mod scenario;
pub mod smart_random;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

/// Shared types and constants
pub use types::*;

pub use error::{AlgoError, EndReason};

/// Flash algorithm
pub use flash::{
    default_success_rate_ranges, CapacityEstimator, ChallengeSelectionRule, EstimationOptions,
    FlashAlgorithmImplementation, FlashAssessmentAlgorithm,
    FlashAssessmentAlgorithmConfiguration, FlashSelection, NextChallengeRequest,
    PossibleChallenges, RuleContext, RuleEngine, SuccessRatePolicy, SuccessRateRange,
};

/// Smart random selection
pub use smart_random::{
    get_possible_skills_for_next_challenge, pick_challenge, SkillCandidate, SmartRandomInput,
    SmartRandomResult,
};

/// Scenario simulation
pub use scenario::{
    simulate, simulate_capacities, AnswerStatusPicker, ChallengePicker, ScenarioOptions,
    ScenarioReport, SimulationStep,
};
