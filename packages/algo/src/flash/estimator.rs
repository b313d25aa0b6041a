//! Capacity Estimator
//!
//! Expected-a-posteriori estimation of the learner capacity under the 2PL
//! model. The posterior is tracked on a fixed grid of 81 points spanning
//! [-9, 9] with a Gaussian prior centred on the initial capacity.
//!
//! Per measure:
//! - likelihood(θ) *= P(θ) for a correct answer, 1 − P(θ) otherwise
//! - level = posterior mean
//! - optionally, the move from the previous level is capped
//!
//! The error rate is the posterior standard deviation around the final
//! level with Sheppard's correction for the grid class interval.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::flash::reward::probability_of_success;
use crate::sanitize::{normalize_distribution, rescale_by_max};
use crate::types::{Answer, CapacityEstimate, Challenge, DEFAULT_CAPACITY, DEFAULT_ERROR_RATE};

// ==================== Constants ====================

const START_OF_SAMPLES: f64 = -9.0;
const END_OF_SAMPLES: f64 = 9.0;
const SAMPLE_COUNT: usize = 81;
const STEP_OF_SAMPLES: f64 = 18.0 / 80.0;
const ERROR_RATE_CLASS_INTERVAL: f64 = 9.0 / 80.0;
const PRIOR_VARIANCE: f64 = 1.5;

/// Estimator knobs carried by the algorithm configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimationOptions {
    /// Answers before this index are measured two by two (0 disables)
    pub double_measures_until: usize,
    /// Largest relative move of the level per measure
    pub variation_percent: Option<f64>,
    /// Stop capping the variation from this answer index on
    pub variation_percent_until: Option<usize>,
}

impl EstimationOptions {
    fn variation_for(&self, answer_index: usize) -> Option<f64> {
        match self.variation_percent_until {
            Some(until) if answer_index >= until => None,
            _ => self.variation_percent,
        }
    }

    fn measure_length(&self, answer_index: usize, answer_count: usize) -> usize {
        if answer_index + 1 < self.double_measures_until && answer_index + 1 < answer_count {
            2
        } else {
            1
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapacityEstimator {
    samples: Vec<f64>,
}

impl Default for CapacityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CapacityEstimator {
    pub fn new() -> Self {
        let samples = (0..SAMPLE_COUNT)
            .map(|i| START_OF_SAMPLES + i as f64 * STEP_OF_SAMPLES)
            .collect();
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn estimate(
        &self,
        answers: &[Answer],
        challenges: &[Challenge],
        initial_capacity: f64,
        options: &EstimationOptions,
    ) -> CapacityEstimate {
        let initial_capacity = if initial_capacity.is_finite() {
            initial_capacity
        } else {
            tracing::warn!(initial_capacity, "non-finite initial capacity, using default");
            DEFAULT_CAPACITY
        };

        let fallback = CapacityEstimate {
            estimated_level: initial_capacity,
            error_rate: DEFAULT_ERROR_RATE,
        };
        if answers.is_empty() {
            return fallback;
        }

        let challenges_by_id: HashMap<&str, &Challenge> =
            challenges.iter().map(|c| (c.id.as_str(), c)).collect();

        let prior_mean = initial_capacity.clamp(START_OF_SAMPLES, END_OF_SAMPLES);
        let prior: Vec<f64> = self
            .samples
            .iter()
            .map(|&sample| gaussian(sample, prior_mean, PRIOR_VARIANCE))
            .collect();
        let mut likelihood = vec![1.0; self.samples.len()];

        let mut level = initial_capacity;
        let mut answer_index = 0;
        let mut measures = 0usize;

        while answer_index < answers.len() {
            let variation = options.variation_for(answer_index);
            let measure_length = options.measure_length(answer_index, answers.len());

            let mut informative = false;
            for answer in &answers[answer_index..answer_index + measure_length] {
                informative |= self.apply_answer(&mut likelihood, answer, &challenges_by_id);
            }
            answer_index += measure_length;

            if !informative {
                continue;
            }
            rescale_by_max(&mut likelihood);

            let previous = level;
            let posterior = posterior(&prior, &likelihood);
            level = posterior
                .map(|weights| self.mean(&weights))
                .unwrap_or(previous);
            if let Some(percent) = variation {
                level = limit_variation(previous, level, percent);
            }
            measures += 1;
        }

        if measures == 0 {
            return fallback;
        }

        let error_rate = posterior(&prior, &likelihood)
            .map(|weights| self.corrected_error_rate(level, &weights))
            .unwrap_or(DEFAULT_ERROR_RATE);

        tracing::debug!(
            answers = answers.len(),
            measures,
            estimated_level = level,
            error_rate,
            "capacity estimated"
        );

        CapacityEstimate {
            estimated_level: level,
            error_rate,
        }
    }

    /// Returns false when the answer carries no usable information
    fn apply_answer(
        &self,
        likelihood: &mut [f64],
        answer: &Answer,
        challenges_by_id: &HashMap<&str, &Challenge>,
    ) -> bool {
        let Some(challenge) = challenges_by_id.get(answer.challenge_id.as_str()) else {
            tracing::warn!(challenge_id = %answer.challenge_id, "answer references an unknown challenge, skipped");
            return false;
        };
        if !challenge.status.is_operative() {
            tracing::warn!(challenge_id = %challenge.id, status = ?challenge.status, "answer on a retired challenge, skipped");
            return false;
        }
        let Some(params) = challenge.irt_params() else {
            tracing::warn!(challenge_id = %challenge.id, "challenge without usable IRT parameters, answer skipped");
            return false;
        };

        let is_ok = answer.is_ok();
        for (value, &sample) in likelihood.iter_mut().zip(&self.samples) {
            let p = probability_of_success(sample, params.discriminant, params.difficulty);
            *value *= if is_ok { p } else { 1.0 - p };
        }
        true
    }

    fn mean(&self, weights: &[f64]) -> f64 {
        self.samples
            .iter()
            .zip(weights)
            .map(|(sample, weight)| sample * weight)
            .sum()
    }

    fn corrected_error_rate(&self, level: f64, weights: &[f64]) -> f64 {
        let variance: f64 = self
            .samples
            .iter()
            .zip(weights)
            .map(|(sample, weight)| weight * (sample - level).powi(2))
            .sum();
        let corrected = variance - ERROR_RATE_CLASS_INTERVAL.powi(2) / 12.0;
        corrected.max(0.0).sqrt()
    }
}

fn gaussian(value: f64, mean: f64, variance: f64) -> f64 {
    (-(value - mean).powi(2) / (2.0 * variance)).exp() / (variance.sqrt() * (2.0 * PI).sqrt())
}

fn posterior(prior: &[f64], likelihood: &[f64]) -> Option<Vec<f64>> {
    let mut weights: Vec<f64> = prior.iter().zip(likelihood).map(|(p, l)| p * l).collect();
    normalize_distribution(&mut weights).then_some(weights)
}

/// Absolute cap when |previous| < 1, relative to the previous level otherwise
fn limit_variation(previous: f64, next: f64, percent: f64) -> f64 {
    let gap = if previous.abs() < 1.0 {
        percent
    } else {
        (previous * percent).abs()
    };
    if next > previous {
        next.min(previous + gap)
    } else {
        next.max(previous - gap)
    }
}
