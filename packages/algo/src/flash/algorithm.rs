//! Flash assessment orchestrator
//!
//! Reconstructs the session from the full answer history on every call:
//! cap check → capacity estimate → minimal success rate → rule engine →
//! selection implementation.

use crate::error::{AlgoError, EndReason};
use crate::flash::config::FlashAssessmentAlgorithmConfiguration;
use crate::flash::rules::{RuleContext, RuleEngine};
use crate::flash::selection::{
    FlashAlgorithmImplementation, FlashSelection, SelectionOptions, SelectionRequest,
};
use crate::flash::success_rate::SuccessRatePolicy;
use crate::sanitize::diagnose_pool;
use crate::types::{Answer, CapacityEstimate, Challenge, ScoredChallenge, DEFAULT_CAPACITY};

/// Inputs of one next-challenge computation
#[derive(Debug, Clone, Copy)]
pub struct NextChallengeRequest<'a> {
    pub all_answers: &'a [Answer],
    pub challenges: &'a [Challenge],
    pub initial_capacity: f64,
    /// Wider history used only for the capacity estimate
    pub answers_for_computing_capacity: Option<&'a [Answer]>,
}

impl<'a> NextChallengeRequest<'a> {
    pub fn new(all_answers: &'a [Answer], challenges: &'a [Challenge]) -> Self {
        Self {
            all_answers,
            challenges,
            initial_capacity: DEFAULT_CAPACITY,
            answers_for_computing_capacity: None,
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: f64) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_answers_for_computing_capacity(mut self, answers: &'a [Answer]) -> Self {
        self.answers_for_computing_capacity = Some(answers);
        self
    }
}

#[derive(Debug)]
pub struct FlashAssessmentAlgorithm<I = FlashSelection> {
    configuration: FlashAssessmentAlgorithmConfiguration,
    rule_engine: RuleEngine,
    success_rate_policy: SuccessRatePolicy,
    implementation: I,
}

impl FlashAssessmentAlgorithm<FlashSelection> {
    pub fn with_configuration(
        configuration: FlashAssessmentAlgorithmConfiguration,
    ) -> Result<Self, AlgoError> {
        Self::new(configuration, FlashSelection::default())
    }
}

impl<I: FlashAlgorithmImplementation> FlashAssessmentAlgorithm<I> {
    pub fn new(
        configuration: FlashAssessmentAlgorithmConfiguration,
        implementation: I,
    ) -> Result<Self, AlgoError> {
        Self::with_rule_engine(configuration, implementation, RuleEngine::default())
    }

    pub fn with_rule_engine(
        configuration: FlashAssessmentAlgorithmConfiguration,
        implementation: I,
        rule_engine: RuleEngine,
    ) -> Result<Self, AlgoError> {
        configuration.validate()?;
        let success_rate_policy =
            SuccessRatePolicy::new(configuration.minimum_estimated_success_rate_ranges.clone())?;

        Ok(Self {
            configuration,
            rule_engine,
            success_rate_policy,
            implementation,
        })
    }

    pub fn configuration(&self) -> &FlashAssessmentAlgorithmConfiguration {
        &self.configuration
    }

    pub fn possible_next_challenges<'a>(
        &self,
        request: NextChallengeRequest<'a>,
    ) -> Result<Vec<ScoredChallenge<'a>>, AlgoError> {
        let answered = request.all_answers.len();
        let maximum = self.configuration.maximum_assessment_length;
        if answered >= maximum {
            tracing::debug!(answered, maximum, "maximum assessment length reached");
            return Err(AlgoError::AssessmentEnded(EndReason::MaximumLengthReached {
                answered,
                maximum,
            }));
        }

        let diagnostics = diagnose_pool(request.challenges);
        if !diagnostics.is_healthy() {
            tracing::warn!(
                missing_params = diagnostics.missing_params,
                degenerate_params = diagnostics.degenerate_params,
                "challenge pool contains unusable IRT parameters"
            );
        }

        let CapacityEstimate {
            estimated_level, ..
        } = self.estimated_level_and_error_rate(
            request
                .answers_for_computing_capacity
                .unwrap_or(request.all_answers),
            request.challenges,
            request.initial_capacity,
        );

        let minimal_success_rate = self.minimal_success_rate(answered);

        let context = RuleContext::new(request.all_answers, request.challenges, &self.configuration);
        let available_challenges = self.rule_engine.execute(&context);

        tracing::debug!(
            answered,
            estimated_level,
            minimal_success_rate,
            available = available_challenges.len(),
            "computing next challenges"
        );

        let outcome = self.implementation.possible_next_challenges(SelectionRequest {
            all_answers: request.all_answers,
            available_challenges,
            all_challenges: request.challenges,
            estimated_level,
            options: SelectionOptions {
                challenges_between_same_competence: self
                    .configuration
                    .challenges_between_same_competence,
                minimal_success_rate,
            },
        });

        if outcome.has_assessment_ended {
            tracing::debug!(answered, "no eligible challenge left");
            return Err(AlgoError::AssessmentEnded(EndReason::NoEligibleChallenges));
        }

        Ok(outcome.possible_challenges)
    }

    pub fn estimated_level_and_error_rate(
        &self,
        all_answers: &[Answer],
        challenges: &[Challenge],
        initial_capacity: f64,
    ) -> CapacityEstimate {
        self.implementation.estimated_level_and_error_rate(
            all_answers,
            challenges,
            initial_capacity,
            &self.configuration.estimation_options(),
        )
    }

    pub fn reward(&self, estimated_level: f64, discriminant: f64, difficulty: f64) -> f64 {
        self.implementation
            .reward(estimated_level, discriminant, difficulty)
    }

    pub fn minimal_success_rate(&self, question_index: usize) -> f64 {
        self.success_rate_policy.minimal_success_rate(question_index)
    }
}
