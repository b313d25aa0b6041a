//! Level prediction and skill rewards for the classic adaptive test.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::smart_random::tube::{SkillCandidate, Tube};
use crate::types::KnowledgeElement;

const LEVEL_STEP: f64 = 0.5;
const MAX_LEVEL_TO_TEST: f64 = 8.0;
const DIFFICULTY_OF_UNKNOWN_SKILL: f64 = 2.0;

/// Reward computed for one candidate skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillReward {
    pub skill_id: String,
    pub reward: f64,
}

pub fn probability_of_correct_answer(level: f64, difficulty: f64) -> f64 {
    1.0 / (1.0 + (-(level - difficulty)).exp())
}

/// Levels 0.5, 1.0, …, 8.0
fn levels_to_test() -> impl Iterator<Item = f64> {
    let count = (MAX_LEVEL_TO_TEST / LEVEL_STEP) as usize;
    (1..=count).map(|i| i as f64 * LEVEL_STEP)
}

fn likelihood(level: f64, outcomes: &[(f64, f64)]) -> f64 {
    let gap: f64 = outcomes
        .iter()
        .map(|&(outcome, difficulty)| outcome - probability_of_correct_answer(level, difficulty))
        .sum();
    -gap.abs()
}

/// Level whose logistic expectation best explains the knowledge elements
pub fn predicted_level(knowledge_elements: &[KnowledgeElement], skills: &[SkillCandidate]) -> f64 {
    let difficulty_by_skill: HashMap<&str, f64> = skills
        .iter()
        .map(|s| (s.id.as_str(), f64::from(s.difficulty)))
        .collect();

    let mut outcomes: Vec<(f64, f64)> = knowledge_elements
        .iter()
        .map(|ke| {
            let difficulty = difficulty_by_skill
                .get(ke.skill_id.as_str())
                .copied()
                .unwrap_or(DIFFICULTY_OF_UNKNOWN_SKILL);
            (if ke.is_validated() { 1.0 } else { 0.0 }, difficulty)
        })
        .collect();
    // One answer anyone solves, one nobody solves
    outcomes.push((1.0, 0.0));
    outcomes.push((0.0, 7.0));

    let mut best_level = LEVEL_STEP;
    let mut best_likelihood = f64::NEG_INFINITY;
    for level in levels_to_test() {
        let value = likelihood(level, &outcomes);
        if value > best_likelihood {
            best_likelihood = value;
            best_level = level;
        }
    }
    best_level
}

pub fn compute_reward(
    skill: &SkillCandidate,
    predicted_level: f64,
    tubes: &[Tube],
    tested_skills: &HashSet<&str>,
) -> f64 {
    let Some(tube) = tubes.iter().find(|t| t.name == skill.tube_name) else {
        return 0.0;
    };
    let untested = |s: &&SkillCandidate| !tested_skills.contains(s.id.as_str());
    let extra_validated = tube.easier_than(skill).filter(untested).count() as f64;
    let extra_failed = tube.harder_than(skill).filter(untested).count() as f64;

    let p = probability_of_correct_answer(predicted_level, f64::from(skill.difficulty));
    p * extra_validated + (1.0 - p) * extra_failed
}

/// All skills sharing the maximal reward; none when that reward is zero
pub fn find_max_rewarding_skills(
    available_skills: &[SkillCandidate],
    predicted_level: f64,
    tubes: &[Tube],
    tested_skills: &HashSet<&str>,
) -> (Vec<SkillCandidate>, Vec<SkillReward>) {
    let rewards: Vec<SkillReward> = available_skills
        .iter()
        .map(|skill| SkillReward {
            skill_id: skill.id.clone(),
            reward: compute_reward(skill, predicted_level, tubes, tested_skills),
        })
        .collect();

    let max_reward = rewards
        .iter()
        .map(|r| r.reward)
        .fold(f64::NEG_INFINITY, f64::max);
    if !(max_reward > 0.0) {
        return (Vec::new(), rewards);
    }

    let best = available_skills
        .iter()
        .zip(&rewards)
        .filter(|(_, r)| r.reward == max_reward)
        .map(|(skill, _)| skill.clone())
        .collect();
    (best, rewards)
}
