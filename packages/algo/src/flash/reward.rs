//! 2PL item information
//!
//! The reward of a challenge is its Fisher information at the current
//! capacity: `a² · p · (1 − p)`, maximal when the difficulty sits on the
//! estimated level and scaled by the squared discriminant.

use crate::sanitize::sanitize_irt_params;
use crate::types::{Challenge, MAX_LOGIT};

/// Probability that a learner at `level` succeeds on the item
pub fn probability_of_success(level: f64, discriminant: f64, difficulty: f64) -> f64 {
    let z = (discriminant * (level - difficulty)).clamp(-MAX_LOGIT, MAX_LOGIT);
    1.0 / (1.0 + (-z).exp())
}

/// Fisher information of the item at `estimated_level`.
///
/// Degenerate inputs (non-positive discriminant, non-finite values) yield
/// `0.0` so a single malformed content record cannot abort a session.
pub fn reward(estimated_level: f64, discriminant: f64, difficulty: f64) -> f64 {
    if !estimated_level.is_finite() {
        return 0.0;
    }
    let Some(params) = sanitize_irt_params(Some(discriminant), Some(difficulty)) else {
        return 0.0;
    };

    let p = probability_of_success(estimated_level, params.discriminant, params.difficulty);
    p * (1.0 - p) * params.discriminant.powi(2)
}

pub fn challenge_reward(estimated_level: f64, challenge: &Challenge) -> f64 {
    match challenge.irt_params() {
        Some(params) => reward(estimated_level, params.discriminant, params.difficulty),
        None => 0.0,
    }
}

pub fn challenge_success_probability(estimated_level: f64, challenge: &Challenge) -> Option<f64> {
    challenge
        .irt_params()
        .map(|params| probability_of_success(estimated_level, params.discriminant, params.difficulty))
}
