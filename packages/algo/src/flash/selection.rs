//! Selection implementations
//!
//! The orchestrator delegates estimation, ranking and reward computation to
//! a [`FlashAlgorithmImplementation`] chosen at construction time.

use std::collections::{HashMap, HashSet};

use crate::flash::estimator::{CapacityEstimator, EstimationOptions};
use crate::flash::reward::{self, challenge_reward, challenge_success_probability};
use crate::types::{
    Answer, CapacityEstimate, Challenge, ScoredChallenge, MAX_NUMBER_OF_RETURNED_CHALLENGES,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionOptions {
    /// Number of latest answers whose competences are avoided (0 disables)
    pub challenges_between_same_competence: usize,
    pub minimal_success_rate: f64,
}

#[derive(Debug, Clone)]
pub struct SelectionRequest<'a, 'r> {
    pub all_answers: &'r [Answer],
    /// Pool left by the rule engine
    pub available_challenges: Vec<&'a Challenge>,
    pub all_challenges: &'a [Challenge],
    pub estimated_level: f64,
    pub options: SelectionOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PossibleChallenges<'a> {
    pub has_assessment_ended: bool,
    pub possible_challenges: Vec<ScoredChallenge<'a>>,
}

impl<'a> PossibleChallenges<'a> {
    pub fn ended() -> Self {
        Self {
            has_assessment_ended: true,
            possible_challenges: Vec::new(),
        }
    }
}

pub trait FlashAlgorithmImplementation: Send + Sync {
    fn estimated_level_and_error_rate(
        &self,
        all_answers: &[Answer],
        challenges: &[Challenge],
        initial_capacity: f64,
        options: &EstimationOptions,
    ) -> CapacityEstimate;

    fn possible_next_challenges<'a>(&self, request: SelectionRequest<'a, '_>) -> PossibleChallenges<'a>;

    fn reward(&self, estimated_level: f64, discriminant: f64, difficulty: f64) -> f64;
}

/// Default implementation: EAP estimation and Fisher-information ranking
#[derive(Debug, Clone)]
pub struct FlashSelection {
    estimator: CapacityEstimator,
    max_returned_challenges: usize,
}

impl Default for FlashSelection {
    fn default() -> Self {
        Self::new(MAX_NUMBER_OF_RETURNED_CHALLENGES)
    }
}

impl FlashSelection {
    pub fn new(max_returned_challenges: usize) -> Self {
        Self {
            estimator: CapacityEstimator::new(),
            max_returned_challenges: max_returned_challenges.max(1),
        }
    }

    fn recent_competences<'a>(
        all_answers: &[Answer],
        all_challenges: &'a [Challenge],
        window: usize,
    ) -> HashSet<&'a str> {
        if window == 0 {
            return HashSet::new();
        }
        let challenges_by_id: HashMap<&str, &'a Challenge> =
            all_challenges.iter().map(|c| (c.id.as_str(), c)).collect();
        let start = all_answers.len().saturating_sub(window);
        all_answers[start..]
            .iter()
            .filter_map(|answer| challenges_by_id.get(answer.challenge_id.as_str()))
            .map(|c| c.competence_id.as_str())
            .collect()
    }
}

/// Keeps the filtered list unless it would be empty
fn filter_or_keep<'a, F>(candidates: Vec<ScoredChallenge<'a>>, keep: F) -> Vec<ScoredChallenge<'a>>
where
    F: Fn(&ScoredChallenge<'a>) -> bool,
{
    let filtered: Vec<ScoredChallenge<'a>> = candidates.iter().copied().filter(|c| keep(c)).collect();
    if filtered.is_empty() {
        candidates
    } else {
        filtered
    }
}

impl FlashAlgorithmImplementation for FlashSelection {
    fn estimated_level_and_error_rate(
        &self,
        all_answers: &[Answer],
        challenges: &[Challenge],
        initial_capacity: f64,
        options: &EstimationOptions,
    ) -> CapacityEstimate {
        self.estimator
            .estimate(all_answers, challenges, initial_capacity, options)
    }

    fn possible_next_challenges<'a>(&self, request: SelectionRequest<'a, '_>) -> PossibleChallenges<'a> {
        let level = request.estimated_level;

        let scored: Vec<ScoredChallenge<'a>> = request
            .available_challenges
            .iter()
            .filter_map(|&challenge| {
                let success_probability = challenge_success_probability(level, challenge)?;
                Some(ScoredChallenge {
                    challenge,
                    reward: challenge_reward(level, challenge),
                    success_probability,
                })
            })
            .collect();

        if scored.is_empty() {
            return PossibleChallenges::ended();
        }

        let minimal_success_rate = request.options.minimal_success_rate;
        let scored = filter_or_keep(scored, |c| c.success_probability >= minimal_success_rate);

        let recent = Self::recent_competences(
            request.all_answers,
            request.all_challenges,
            request.options.challenges_between_same_competence,
        );
        let mut scored = filter_or_keep(scored, |c| {
            !recent.contains(c.challenge.competence_id.as_str())
        });

        scored.sort_by(|a, b| b.reward.total_cmp(&a.reward));
        scored.truncate(self.max_returned_challenges);

        PossibleChallenges {
            has_assessment_ended: false,
            possible_challenges: scored,
        }
    }

    fn reward(&self, estimated_level: f64, discriminant: f64, difficulty: f64) -> f64 {
        reward::reward(estimated_level, discriminant, difficulty)
    }
}
