//! End-to-end tests for the flash assessment algorithm.
//!
//! Covers the orchestrator contract: termination, candidate ranking, rule
//! interplay and capacity estimation through the public API.

use pix_algo::{
    AlgoError, Answer, AnswerStatus, Challenge, ChallengeStatus, EndReason,
    FlashAssessmentAlgorithm, FlashAssessmentAlgorithmConfiguration, NextChallengeRequest,
};

// ============================================================================
// Fixtures
// ============================================================================

fn challenge(id: &str, tube: &str, competence: &str, discriminant: f64, difficulty: f64) -> Challenge {
    Challenge {
        id: id.to_string(),
        skill_id: format!("skill-{id}"),
        tube_id: tube.to_string(),
        competence_id: competence.to_string(),
        discriminant: Some(discriminant),
        difficulty: Some(difficulty),
        locales: vec!["fr-fr".to_string()],
        status: ChallengeStatus::Validated,
        timer: None,
    }
}

fn spread_pool(size: usize, competences: usize) -> Vec<Challenge> {
    (0..size)
        .map(|i| {
            challenge(
                &format!("rec{i}"),
                &format!("tube{i}"),
                &format!("comp{}", i % competences),
                1.0 + (i % 3) as f64 * 0.5,
                -4.0 + 8.0 * i as f64 / size as f64,
            )
        })
        .collect()
}

fn algorithm(configuration: FlashAssessmentAlgorithmConfiguration) -> FlashAssessmentAlgorithm {
    FlashAssessmentAlgorithm::with_configuration(configuration).unwrap()
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_three_items_two_tubes_returns_candidates() {
    let challenges = vec![
        challenge("rec1", "tube1", "comp1", 1.5, -1.0),
        challenge("rec2", "tube1", "comp1", 1.5, 0.0),
        challenge("rec3", "tube2", "comp2", 1.5, 1.0),
    ];
    let algorithm = algorithm(FlashAssessmentAlgorithmConfiguration {
        maximum_assessment_length: 10,
        ..Default::default()
    });

    let next = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&[], &challenges))
        .unwrap();
    assert!(!next.is_empty());
    assert!(next.len() <= 3);
}

#[test]
fn test_history_at_maximum_length_ends_assessment() {
    let challenges = spread_pool(20, 4);
    let answers: Vec<Answer> = challenges
        .iter()
        .take(10)
        .map(|c| Answer::new(c.id.clone(), AnswerStatus::Ok))
        .collect();
    let algorithm = algorithm(FlashAssessmentAlgorithmConfiguration {
        maximum_assessment_length: 10,
        ..Default::default()
    });

    let err = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
        .unwrap_err();
    assert!(err.is_assessment_ended());
    assert_eq!(
        err,
        AlgoError::AssessmentEnded(EndReason::MaximumLengthReached {
            answered: 10,
            maximum: 10
        })
    );
}

#[test]
fn test_exhausted_pool_ends_assessment() {
    let challenges = spread_pool(3, 1);
    let answers: Vec<Answer> = challenges
        .iter()
        .map(|c| Answer::new(c.id.clone(), AnswerStatus::Ko))
        .collect();
    let algorithm = algorithm(Default::default());

    let err = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
        .unwrap_err();
    assert_eq!(err.end_reason(), Some(EndReason::NoEligibleChallenges));
}

#[test]
fn test_unusable_pool_ends_assessment() {
    let mut archived = challenge("rec1", "tube1", "comp1", 1.0, 0.0);
    archived.status = ChallengeStatus::Archived;
    let mut missing = challenge("rec2", "tube2", "comp1", 1.0, 0.0);
    missing.difficulty = None;
    let challenges = vec![archived, missing];

    let err = algorithm(Default::default())
        .possible_next_challenges(NextChallengeRequest::new(&[], &challenges))
        .unwrap_err();
    assert_eq!(err.end_reason(), Some(EndReason::NoEligibleChallenges));
}

// ============================================================================
// Candidates
// ============================================================================

#[test]
fn test_candidates_capped_and_sorted_by_reward() {
    let challenges = spread_pool(40, 4);
    let next = algorithm(Default::default())
        .possible_next_challenges(NextChallengeRequest::new(&[], &challenges))
        .unwrap();

    assert!(next.len() <= 5);
    assert!(next.windows(2).all(|pair| pair[0].reward >= pair[1].reward));
}

#[test]
fn test_answered_challenges_never_come_back() {
    let challenges = spread_pool(12, 3);
    let algorithm = algorithm(FlashAssessmentAlgorithmConfiguration {
        minimum_estimated_success_rate_ranges: Vec::new(),
        ..Default::default()
    });
    let mut answers = Vec::new();

    for _ in 0..8 {
        let next = algorithm
            .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
            .unwrap();
        let chosen = next[0].challenge.id.clone();
        assert!(answers.iter().all(|a: &Answer| a.challenge_id != chosen));
        answers.push(Answer::new(chosen, AnswerStatus::Ok));
    }
}

#[test]
fn test_one_question_per_tube() {
    let challenges = vec![
        challenge("rec1", "tube1", "comp1", 1.5, 0.0),
        challenge("rec2", "tube1", "comp1", 1.5, 0.1),
        challenge("rec3", "tube2", "comp1", 1.5, 3.0),
    ];
    let answers = vec![Answer::new("rec1", AnswerStatus::Ok)];
    let algorithm = algorithm(FlashAssessmentAlgorithmConfiguration {
        limit_to_one_question_per_tube: true,
        ..Default::default()
    });

    let next = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
        .unwrap();
    let ids: Vec<&str> = next.iter().map(|c| c.challenge.id.as_str()).collect();
    assert_eq!(ids, vec!["rec3"]);
}

#[test]
fn test_passage_by_all_competences_restricts_then_lifts() {
    let challenges = vec![
        challenge("rec1", "tube1", "comp1", 1.5, 0.0),
        challenge("rec2", "tube2", "comp1", 1.5, 0.0),
        challenge("rec3", "tube3", "comp2", 1.5, 2.0),
        challenge("rec4", "tube4", "comp1", 1.5, 0.5),
    ];
    let algorithm = algorithm(FlashAssessmentAlgorithmConfiguration {
        enable_passage_by_all_competences: true,
        minimum_estimated_success_rate_ranges: Vec::new(),
        ..Default::default()
    });

    let answers = vec![Answer::new("rec1", AnswerStatus::Ok)];
    let next = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
        .unwrap();
    assert!(next.iter().all(|c| c.challenge.competence_id == "comp2"));

    let answers = vec![
        Answer::new("rec1", AnswerStatus::Ok),
        Answer::new("rec3", AnswerStatus::Ok),
    ];
    let next = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
        .unwrap();
    let mut ids: Vec<&str> = next.iter().map(|c| c.challenge.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["rec2", "rec4"]);
}

#[test]
fn test_forced_competences_after_warm_up() {
    let challenges = vec![
        challenge("rec1", "tube1", "comp1", 1.5, 0.0),
        challenge("rec2", "tube2", "comp1", 1.5, 0.0),
        challenge("rec3", "tube3", "comp2", 1.5, 4.0),
        challenge("rec4", "tube4", "comp3", 1.5, 0.0),
    ];
    let algorithm = algorithm(FlashAssessmentAlgorithmConfiguration {
        warm_up_length: 1,
        forced_competences: vec!["comp2".to_string()],
        minimum_estimated_success_rate_ranges: Vec::new(),
        ..Default::default()
    });

    let warm_up = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&[], &challenges))
        .unwrap();
    assert!(warm_up.len() > 1);

    let answers = vec![Answer::new("rec1", AnswerStatus::Ok)];
    let next = algorithm
        .possible_next_challenges(NextChallengeRequest::new(&answers, &challenges))
        .unwrap();
    let ids: Vec<&str> = next.iter().map(|c| c.challenge.id.as_str()).collect();
    assert_eq!(ids, vec!["rec3"]);
}

// ============================================================================
// Success rate and estimation
// ============================================================================

#[test]
fn test_default_minimal_success_rates() {
    let algorithm = algorithm(Default::default());
    for index in 0..=7 {
        assert!((algorithm.minimal_success_rate(index) - 0.8).abs() < 1e-12);
    }
    assert!((algorithm.minimal_success_rate(8) - 0.8).abs() < 1e-12);
    let middle = algorithm.minimal_success_rate(11);
    assert!(middle < 0.8 && middle > 0.5);
    assert!((algorithm.minimal_success_rate(15) - 0.5).abs() < 1e-12);
    assert_eq!(algorithm.minimal_success_rate(16), 0.0);
    assert_eq!(algorithm.minimal_success_rate(100), 0.0);
}

#[test]
fn test_estimation_is_deterministic() {
    let challenges = spread_pool(20, 4);
    let answers: Vec<Answer> = challenges
        .iter()
        .step_by(2)
        .enumerate()
        .map(|(i, c)| {
            let status = if i % 2 == 0 { AnswerStatus::Ok } else { AnswerStatus::Ko };
            Answer::new(c.id.clone(), status)
        })
        .collect();
    let algorithm = algorithm(Default::default());

    let first = algorithm.estimated_level_and_error_rate(&answers, &challenges, 0.0);
    let second = algorithm.estimated_level_and_error_rate(&answers, &challenges, 0.0);
    assert_eq!(first, second);
}

#[test]
fn test_estimate_moves_with_answers() {
    let challenges = spread_pool(10, 2);
    let algorithm = algorithm(Default::default());
    let with_status = |status: AnswerStatus| -> Vec<Answer> {
        challenges
            .iter()
            .take(5)
            .map(|c| Answer::new(c.id.clone(), status))
            .collect()
    };

    let up = algorithm.estimated_level_and_error_rate(&with_status(AnswerStatus::Ok), &challenges, 0.0);
    let down = algorithm.estimated_level_and_error_rate(&with_status(AnswerStatus::Ko), &challenges, 0.0);
    assert!(up.estimated_level > 0.0);
    assert!(down.estimated_level < 0.0);
    assert!(up.error_rate < 5.0);
}

#[test]
fn test_extreme_history_stays_on_grid() {
    let challenges: Vec<Challenge> = (0..32)
        .map(|i| challenge(&format!("rec{i}"), &format!("tube{i}"), "comp1", 3.0, -8.0))
        .collect();
    let answers: Vec<Answer> = challenges
        .iter()
        .map(|c| Answer::new(c.id.clone(), AnswerStatus::Ko))
        .collect();

    let estimate = algorithm(Default::default()).estimated_level_and_error_rate(&answers, &challenges, 0.0);
    assert!(estimate.estimated_level.is_finite());
    assert!(estimate.error_rate.is_finite());
    assert!((-9.0..=9.0).contains(&estimate.estimated_level));
}

#[test]
fn test_unknown_answers_are_ignored() {
    let challenges = spread_pool(10, 2);
    let algorithm = algorithm(Default::default());
    let answers = vec![Answer::new("rec2", AnswerStatus::Ok)];
    let with_unknown = vec![
        Answer::new("rec2", AnswerStatus::Ok),
        Answer::new("not-in-pool", AnswerStatus::Ko),
    ];

    assert_eq!(
        algorithm.estimated_level_and_error_rate(&answers, &challenges, 0.0),
        algorithm.estimated_level_and_error_rate(&with_unknown, &challenges, 0.0)
    );
}

#[test]
fn test_no_answers_gives_default_estimate() {
    let estimate = algorithm(Default::default()).estimated_level_and_error_rate(&[], &[], 1.5);
    assert_eq!(estimate.estimated_level, 1.5);
    assert_eq!(estimate.error_rate, 5.0);
}
