//! Scenario simulation
//!
//! Replays a whole flash assessment against a challenge pool, answering with a
//! configurable picker. Used to tune configurations offline and by the
//! `pix-scenario-simulator` binary.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AlgoError, EndReason};
use crate::flash::reward::challenge_success_probability;
use crate::flash::{FlashAlgorithmImplementation, FlashAssessmentAlgorithm, NextChallengeRequest};
use crate::types::{Answer, AnswerStatus, Challenge, ScoredChallenge, DEFAULT_CAPACITY};

const RANDOM_ANSWER_STATUSES: [AnswerStatus; 3] =
    [AnswerStatus::Ok, AnswerStatus::Ko, AnswerStatus::Skipped];

// ==================== Pickers ====================

/// How the simulated learner answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnswerStatusPicker {
    /// Replays the list, the scenario stops when it runs out
    Deterministic { statuses: Vec<AnswerStatus> },
    /// Uniform over ok / ko / aband
    Random { seed: u64 },
    /// Answers like a learner of the given capacity
    Capacity {
        capacity: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Which candidate is presented among the possible challenges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChallengePicker {
    #[default]
    First,
    Random { seed: u64 },
}

struct AnswerSource<'p> {
    picker: &'p AnswerStatusPicker,
    rng: Option<ChaCha8Rng>,
}

impl<'p> AnswerSource<'p> {
    fn new(picker: &'p AnswerStatusPicker) -> Self {
        let rng = match picker {
            AnswerStatusPicker::Deterministic { .. } => None,
            AnswerStatusPicker::Random { seed } => Some(ChaCha8Rng::seed_from_u64(*seed)),
            AnswerStatusPicker::Capacity { seed, .. } => seed.map(ChaCha8Rng::seed_from_u64),
        };
        Self { picker, rng }
    }

    fn next(&mut self, index: usize, challenge: &Challenge) -> Option<AnswerStatus> {
        match self.picker {
            AnswerStatusPicker::Deterministic { statuses } => statuses.get(index).copied(),
            AnswerStatusPicker::Random { .. } => {
                let rng = self.rng.as_mut()?;
                RANDOM_ANSWER_STATUSES.choose(rng).copied()
            }
            AnswerStatusPicker::Capacity { capacity, .. } => {
                let probability = challenge_success_probability(*capacity, challenge).unwrap_or(0.0);
                let succeeded = match self.rng.as_mut() {
                    Some(rng) => rng.gen::<f64>() < probability,
                    None => probability >= 0.5,
                };
                Some(if succeeded {
                    AnswerStatus::Ok
                } else {
                    AnswerStatus::Ko
                })
            }
        }
    }
}

struct ChallengeSource {
    rng: Option<ChaCha8Rng>,
}

impl ChallengeSource {
    fn new(picker: ChallengePicker) -> Self {
        let rng = match picker {
            ChallengePicker::First => None,
            ChallengePicker::Random { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
        };
        Self { rng }
    }

    fn pick<'c, 'a>(&mut self, candidates: &'c [ScoredChallenge<'a>]) -> Option<&'c ScoredChallenge<'a>> {
        match self.rng.as_mut() {
            Some(rng) => candidates.choose(rng),
            None => candidates.first(),
        }
    }
}

// ==================== Scenario ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOptions {
    #[serde(default)]
    pub initial_capacity: f64,
    pub answer_status_picker: AnswerStatusPicker,
    #[serde(default)]
    pub challenge_picker: ChallengePicker,
    #[serde(default)]
    pub stop_at_challenge: Option<usize>,
}

impl ScenarioOptions {
    pub fn new(answer_status_picker: AnswerStatusPicker) -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            answer_status_picker,
            challenge_picker: ChallengePicker::First,
            stop_at_challenge: None,
        }
    }
}

/// One presented challenge and the estimate right after its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    pub index: usize,
    pub challenge_id: String,
    pub reward: f64,
    pub success_probability: f64,
    pub answer_status: AnswerStatus,
    pub estimated_level: f64,
    pub error_rate: f64,
    pub minimal_success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub steps: Vec<SimulationStep>,
    pub estimated_level: f64,
    pub error_rate: f64,
    /// None when the scenario stopped on its own (picker exhausted or stop index)
    pub end_reason: Option<EndReason>,
}

pub fn simulate<I: FlashAlgorithmImplementation>(
    algorithm: &FlashAssessmentAlgorithm<I>,
    challenges: &[Challenge],
    options: &ScenarioOptions,
) -> Result<ScenarioReport, AlgoError> {
    let mut answer_source = AnswerSource::new(&options.answer_status_picker);
    let mut challenge_source = ChallengeSource::new(options.challenge_picker);
    let mut answers: Vec<Answer> = Vec::new();
    let mut steps = Vec::new();
    let mut end_reason = None;

    loop {
        let index = answers.len();
        if options.stop_at_challenge.is_some_and(|stop| index >= stop) {
            break;
        }

        let (challenge_id, reward, success_probability, picked_status) = {
            let request = NextChallengeRequest::new(&answers, challenges)
                .with_initial_capacity(options.initial_capacity);
            let candidates = match algorithm.possible_next_challenges(request) {
                Ok(candidates) => candidates,
                Err(AlgoError::AssessmentEnded(reason)) => {
                    end_reason = Some(reason);
                    break;
                }
                Err(err) => return Err(err),
            };
            let Some(chosen) = challenge_source.pick(&candidates) else {
                end_reason = Some(EndReason::NoEligibleChallenges);
                break;
            };
            (
                chosen.challenge.id.clone(),
                chosen.reward,
                chosen.success_probability,
                answer_source.next(index, chosen.challenge),
            )
        };
        let Some(answer_status) = picked_status else {
            tracing::debug!(index, "answer picker exhausted");
            break;
        };
        let minimal_success_rate = algorithm.minimal_success_rate(index);

        answers.push(Answer::new(challenge_id.clone(), answer_status));
        let estimate =
            algorithm.estimated_level_and_error_rate(&answers, challenges, options.initial_capacity);

        steps.push(SimulationStep {
            index,
            challenge_id,
            reward,
            success_probability,
            answer_status,
            estimated_level: estimate.estimated_level,
            error_rate: estimate.error_rate,
            minimal_success_rate,
        });
    }

    let estimate = algorithm.estimated_level_and_error_rate(&answers, challenges, options.initial_capacity);
    tracing::info!(
        answered = steps.len(),
        estimated_level = estimate.estimated_level,
        error_rate = estimate.error_rate,
        "scenario finished"
    );

    Ok(ScenarioReport {
        steps,
        estimated_level: estimate.estimated_level,
        error_rate: estimate.error_rate,
        end_reason,
    })
}

/// One capacity-driven scenario per simulated capacity, reports in input order
pub fn simulate_capacities<I: FlashAlgorithmImplementation>(
    algorithm: &FlashAssessmentAlgorithm<I>,
    challenges: &[Challenge],
    capacities: &[f64],
    options: &ScenarioOptions,
    seed: Option<u64>,
) -> Result<Vec<ScenarioReport>, AlgoError> {
    capacities
        .par_iter()
        .enumerate()
        .map(|(i, &capacity)| {
            let scenario = ScenarioOptions {
                answer_status_picker: AnswerStatusPicker::Capacity {
                    capacity,
                    seed: seed.map(|s| s.wrapping_add(i as u64)),
                },
                ..options.clone()
            };
            simulate(algorithm, challenges, &scenario)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashAssessmentAlgorithmConfiguration;
    use crate::types::ChallengeStatus;

    fn challenge(id: &str, competence: &str, difficulty: f64) -> Challenge {
        Challenge {
            id: id.to_string(),
            skill_id: format!("s-{id}"),
            tube_id: format!("t-{id}"),
            competence_id: competence.to_string(),
            discriminant: Some(1.5),
            difficulty: Some(difficulty),
            locales: vec!["fr-fr".to_string()],
            status: ChallengeStatus::Validated,
            timer: None,
        }
    }

    fn pool(size: usize) -> Vec<Challenge> {
        (0..size)
            .map(|i| {
                challenge(
                    &format!("c{i}"),
                    &format!("comp{}", i % 4),
                    -3.0 + 6.0 * i as f64 / size as f64,
                )
            })
            .collect()
    }

    fn algorithm(maximum: usize) -> FlashAssessmentAlgorithm {
        FlashAssessmentAlgorithm::with_configuration(FlashAssessmentAlgorithmConfiguration {
            maximum_assessment_length: maximum,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_deterministic_stops_when_exhausted() {
        let challenges = pool(20);
        let options = ScenarioOptions::new(AnswerStatusPicker::Deterministic {
            statuses: vec![AnswerStatus::Ok, AnswerStatus::Ko, AnswerStatus::Ok],
        });
        let report = simulate(&algorithm(10), &challenges, &options).unwrap();
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.end_reason, None);
        assert_eq!(report.steps[1].answer_status, AnswerStatus::Ko);
    }

    #[test]
    fn test_maximum_length_respected() {
        let challenges = pool(20);
        let options = ScenarioOptions::new(AnswerStatusPicker::Random { seed: 3 });
        let report = simulate(&algorithm(6), &challenges, &options).unwrap();
        assert_eq!(report.steps.len(), 6);
        assert_eq!(
            report.end_reason,
            Some(EndReason::MaximumLengthReached {
                answered: 6,
                maximum: 6
            })
        );
        let mut ids: Vec<&str> = report.steps.iter().map(|s| s.challenge_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_stop_at_challenge() {
        let challenges = pool(20);
        let options = ScenarioOptions {
            stop_at_challenge: Some(2),
            ..ScenarioOptions::new(AnswerStatusPicker::Capacity {
                capacity: 1.0,
                seed: None,
            })
        };
        let report = simulate(&algorithm(10), &challenges, &options).unwrap();
        assert_eq!(report.steps.len(), 2);
    }

    #[test]
    fn test_seeded_scenario_is_reproducible() {
        let challenges = pool(20);
        let options = ScenarioOptions {
            challenge_picker: ChallengePicker::Random { seed: 11 },
            ..ScenarioOptions::new(AnswerStatusPicker::Capacity {
                capacity: 0.5,
                seed: Some(5),
            })
        };
        let algorithm = algorithm(8);
        let first = simulate(&algorithm, &challenges, &options).unwrap();
        let second = simulate(&algorithm, &challenges, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_capacity_drives_estimate() {
        let challenges = pool(30);
        let algorithm = algorithm(12);
        let options = ScenarioOptions::new(AnswerStatusPicker::Deterministic {
            statuses: Vec::new(),
        });
        let reports =
            simulate_capacities(&algorithm, &challenges, &[-2.0, 2.0], &options, None).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].estimated_level < reports[1].estimated_level);
    }

    #[test]
    fn test_picker_deserializes_from_json() {
        let picker: AnswerStatusPicker =
            serde_json::from_str(r#"{"type":"deterministic","statuses":["ok","ko","aband"]}"#)
                .unwrap();
        assert_eq!(
            picker,
            AnswerStatusPicker::Deterministic {
                statuses: vec![AnswerStatus::Ok, AnswerStatus::Ko, AnswerStatus::Skipped]
            }
        );
        let picker: ChallengePicker = serde_json::from_str(r#"{"type":"random","seed":4}"#).unwrap();
        assert_eq!(picker, ChallengePicker::Random { seed: 4 });
    }
}
