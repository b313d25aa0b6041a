//! Smart random selection
//!
//! Skill-based adaptive selection for classic campaigns: a coarse level is
//! predicted from knowledge elements, candidate skills are filtered, then the
//! most informative skills are kept.
//!
//! - [`tube`] - skill candidates and their grouping by tube
//! - [`cat`] - predicted level and skill reward
//! - [`skills_filter`] - filtering pipelines for the first and next challenges

pub mod cat;
pub mod skills_filter;
pub mod tube;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Answer, Challenge, KnowledgeElement, KnowledgeElementStatus, Skill};

pub use cat::{predicted_level, SkillReward};
pub use skills_filter::{FilterCounts, DEFAULT_LEVEL_FOR_FIRST_CHALLENGE};
pub use tube::{group_by_tubes, SkillCandidate, Tube};

/// Everything known about a learner for one smart random step
#[derive(Debug, Clone, Copy)]
pub struct SmartRandomInput<'a> {
    pub knowledge_elements: &'a [KnowledgeElement],
    pub challenges: &'a [Challenge],
    pub target_skills: &'a [Skill],
    pub last_answer: Option<&'a Answer>,
    pub all_answers: &'a [Answer],
    pub locale: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartRandomDetails {
    pub is_first_challenge: bool,
    pub last_challenge_timed: bool,
    pub filter_counts: FilterCounts,
    pub skill_rewards: Vec<SkillReward>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartRandomResult {
    pub has_assessment_ended: bool,
    pub possible_skills_for_next_challenge: Vec<SkillCandidate>,
    pub level_estimated: f64,
    pub details: SmartRandomDetails,
}

fn was_last_challenge_timed(last_answer: Option<&Answer>) -> bool {
    last_answer
        .and_then(|answer| answer.timeout)
        .is_some_and(|timeout| timeout != 0)
}

/// Skills already covered by a knowledge element or an answered challenge
fn tested_skill_ids<'a>(
    knowledge_elements: &'a [KnowledgeElement],
    all_answers: &[Answer],
    challenges: &'a [Challenge],
) -> HashSet<&'a str> {
    let answered: HashSet<&str> = all_answers.iter().map(|a| a.challenge_id.as_str()).collect();

    knowledge_elements
        .iter()
        .map(|ke| ke.skill_id.as_str())
        .chain(
            challenges
                .iter()
                .filter(|c| answered.contains(c.id.as_str()))
                .map(|c| c.skill_id.as_str()),
        )
        .collect()
}

pub fn get_possible_skills_for_next_challenge(input: SmartRandomInput<'_>) -> SmartRandomResult {
    let candidates: Vec<SkillCandidate> = input
        .target_skills
        .iter()
        .map(|skill| SkillCandidate::from_skill(skill, input.challenges, input.locale))
        .collect();
    let tubes = group_by_tubes(&candidates);

    let target_ids: HashSet<&str> = input.target_skills.iter().map(|s| s.id.as_str()).collect();
    let knowledge_elements: Vec<KnowledgeElement> = input
        .knowledge_elements
        .iter()
        .filter(|ke| target_ids.contains(ke.skill_id.as_str()))
        .filter(|ke| ke.status != KnowledgeElementStatus::Reset)
        .cloned()
        .collect();
    let tested = tested_skill_ids(&knowledge_elements, input.all_answers, input.challenges);
    let last_challenge_timed = was_last_challenge_timed(input.last_answer);

    if input.last_answer.is_none() {
        let (skills, filter_counts) =
            skills_filter::filtered_skills_for_first_challenge(&tested, &tubes, &candidates);
        tracing::debug!(
            candidates = candidates.len(),
            kept = skills.len(),
            "smart random first challenge"
        );
        return SmartRandomResult {
            has_assessment_ended: skills.is_empty(),
            possible_skills_for_next_challenge: skills,
            level_estimated: f64::from(DEFAULT_LEVEL_FOR_FIRST_CHALLENGE),
            details: SmartRandomDetails {
                is_first_challenge: true,
                last_challenge_timed,
                filter_counts,
                skill_rewards: Vec::new(),
            },
        };
    }

    let level = predicted_level(&knowledge_elements, &candidates);
    let (filtered, filter_counts) = skills_filter::filtered_skills_for_next_challenge(
        &tested,
        &tubes,
        level,
        last_challenge_timed,
        &candidates,
    );
    let (skills, skill_rewards) = cat::find_max_rewarding_skills(&filtered, level, &tubes, &tested);

    tracing::debug!(
        predicted_level = level,
        filtered = filtered.len(),
        kept = skills.len(),
        last_challenge_timed,
        "smart random next challenge"
    );

    SmartRandomResult {
        has_assessment_ended: skills.is_empty(),
        possible_skills_for_next_challenge: skills,
        level_estimated: level,
        details: SmartRandomDetails {
            is_first_challenge: false,
            last_challenge_timed,
            filter_counts,
            skill_rewards,
        },
    }
}

/// Picks one skill then one of its playable challenges, reproducibly for a given seed
pub fn pick_challenge<'a>(
    skills: &[SkillCandidate],
    challenges: &'a [Challenge],
    locale: &str,
    seed: u64,
) -> Option<&'a Challenge> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let skill = skills.choose(&mut rng)?;
    let playable: Vec<&'a Challenge> = challenges
        .iter()
        .filter(|c| c.skill_id == skill.id && c.is_playable_in(locale))
        .collect();
    playable.choose(&mut rng).copied()
}
