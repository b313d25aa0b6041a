//! Property-Based Tests for the flash algorithm
//!
//! Tests the following invariants:
//! - Rule engine output is a subset of the selectable pool, without answered challenges
//! - Next-challenge computation is deterministic
//! - Candidates are capped and ordered by reward
//! - Reward decreases as the item moves away from the level
//! - Capacity estimates stay finite and on the sampling grid

use proptest::prelude::*;
use std::collections::HashSet;

use pix_algo::flash::reward;
use pix_algo::{
    Answer, AnswerStatus, Challenge, ChallengeStatus, FlashAssessmentAlgorithm,
    FlashAssessmentAlgorithmConfiguration, NextChallengeRequest, RuleContext, RuleEngine,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_status() -> impl Strategy<Value = ChallengeStatus> {
    prop_oneof![
        8 => Just(ChallengeStatus::Validated),
        1 => Just(ChallengeStatus::Archived),
        1 => Just(ChallengeStatus::Proposed),
    ]
}

fn arb_challenge_parts() -> impl Strategy<Value = (u8, u8, u8, f64, f64, ChallengeStatus)> {
    (
        0u8..6,          // skill
        0u8..4,          // tube
        0u8..3,          // competence
        (0.2f64..3.0),   // discriminant
        (-5.0f64..5.0),  // difficulty
        arb_status(),
    )
}

fn arb_pool() -> impl Strategy<Value = Vec<Challenge>> {
    prop::collection::vec(arb_challenge_parts(), 1..30).prop_map(|parts| {
        parts
            .into_iter()
            .enumerate()
            .map(|(i, (skill, tube, competence, discriminant, difficulty, status))| Challenge {
                id: format!("rec{i}"),
                skill_id: format!("skill{skill}"),
                tube_id: format!("tube{tube}"),
                competence_id: format!("comp{competence}"),
                discriminant: Some(discriminant),
                difficulty: Some(difficulty),
                locales: vec!["fr-fr".to_string()],
                status,
                timer: None,
            })
            .collect()
    })
}

fn arb_answer_status() -> impl Strategy<Value = AnswerStatus> {
    prop_oneof![
        Just(AnswerStatus::Ok),
        Just(AnswerStatus::Ko),
        Just(AnswerStatus::Skipped),
        Just(AnswerStatus::TimedOut),
    ]
}

/// Pool plus a history answering some of its challenges once each
fn arb_pool_and_answers() -> impl Strategy<Value = (Vec<Challenge>, Vec<Answer>)> {
    arb_pool().prop_flat_map(|pool| {
        let size = pool.len();
        (
            Just(pool),
            prop::collection::vec((0..size, arb_answer_status()), 0..size),
        )
            .prop_map(|(pool, picks)| {
                let mut seen = HashSet::new();
                let answers = picks
                    .into_iter()
                    .filter(|(index, _)| seen.insert(*index))
                    .map(|(index, status)| Answer::new(pool[index].id.clone(), status))
                    .collect();
                (pool, answers)
            })
    })
}

fn arb_configuration() -> impl Strategy<Value = FlashAssessmentAlgorithmConfiguration> {
    (any::<bool>(), any::<bool>(), 0usize..3, 0usize..4).prop_map(
        |(one_per_tube, all_competences, between, warm_up)| FlashAssessmentAlgorithmConfiguration {
            limit_to_one_question_per_tube: one_per_tube,
            enable_passage_by_all_competences: all_competences,
            challenges_between_same_competence: between,
            warm_up_length: warm_up,
            forced_competences: vec!["comp1".to_string()],
            maximum_assessment_length: 100,
            ..Default::default()
        },
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_rule_engine_output_is_subset(
        (pool, answers) in arb_pool_and_answers(),
        configuration in arb_configuration(),
    ) {
        let context = RuleContext::new(&answers, &pool, &configuration);
        let available = RuleEngine::with_default_rules().execute(&context);

        let pool_ids: HashSet<&str> = pool
            .iter()
            .filter(|c| c.status == ChallengeStatus::Validated)
            .map(|c| c.id.as_str())
            .collect();
        let answered: HashSet<&str> = answers.iter().map(|a| a.challenge_id.as_str()).collect();

        for challenge in &available {
            prop_assert!(pool_ids.contains(challenge.id.as_str()));
            prop_assert!(!answered.contains(challenge.id.as_str()));
        }
    }

    #[test]
    fn prop_next_challenges_deterministic_and_ranked(
        (pool, answers) in arb_pool_and_answers(),
        configuration in arb_configuration(),
    ) {
        let algorithm = FlashAssessmentAlgorithm::with_configuration(configuration).unwrap();
        let first = algorithm.possible_next_challenges(NextChallengeRequest::new(&answers, &pool));
        let second = algorithm.possible_next_challenges(NextChallengeRequest::new(&answers, &pool));
        prop_assert_eq!(&first, &second);

        if let Ok(candidates) = first {
            prop_assert!(!candidates.is_empty());
            prop_assert!(candidates.len() <= 5);
            for pair in candidates.windows(2) {
                prop_assert!(pair[0].reward >= pair[1].reward);
            }
        }
    }

    #[test]
    fn prop_reward_decreases_with_distance(
        level in -6.0f64..6.0,
        discriminant in 0.1f64..4.0,
        near in 0.0f64..3.0,
        extra in 0.0f64..3.0,
    ) {
        let close = reward(level, discriminant, level + near);
        let far = reward(level, discriminant, level - (near + extra));
        prop_assert!(close >= far - 1e-12);
        prop_assert!(close >= 0.0);
    }

    #[test]
    fn prop_estimate_stays_on_grid((pool, answers) in arb_pool_and_answers()) {
        let algorithm = FlashAssessmentAlgorithm::with_configuration(Default::default()).unwrap();
        let estimate = algorithm.estimated_level_and_error_rate(&answers, &pool, 0.0);
        prop_assert!(estimate.estimated_level.is_finite());
        prop_assert!(estimate.error_rate.is_finite());
        prop_assert!((-9.0..=9.0).contains(&estimate.estimated_level));
        prop_assert!(estimate.error_rate >= 0.0);
    }
}
