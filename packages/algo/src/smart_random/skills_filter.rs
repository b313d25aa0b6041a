use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::smart_random::tube::{SkillCandidate, Tube};

pub const DEFAULT_LEVEL_FOR_FIRST_CHALLENGE: u8 = 2;
const MAX_LEVEL_TO_BE_AN_EASY_TUBE: u8 = 3;
const MAX_DIFF_BETWEEN_USER_LEVEL_AND_SKILL_LEVEL: f64 = 2.0;

/// Number of skills left after each filtering stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    pub playable: usize,
    pub untested: usize,
    pub from_easy_tubes: usize,
    pub timing: usize,
    pub level: usize,
}

fn playable_skills(skills: &[SkillCandidate]) -> Vec<SkillCandidate> {
    skills.iter().filter(|s| s.playable).cloned().collect()
}

fn untested_skills(tested_skills: &HashSet<&str>, skills: Vec<SkillCandidate>) -> Vec<SkillCandidate> {
    skills
        .into_iter()
        .filter(|s| !tested_skills.contains(s.id.as_str()))
        .collect()
}

/// Easy tubes: the hardest skill is at most level 3. Falls back to every skill when none remain
fn keep_skills_from_easy_tubes(tubes: &[Tube], skills: Vec<SkillCandidate>) -> Vec<SkillCandidate> {
    let easy_skill_ids: HashSet<&str> = tubes
        .iter()
        .filter(|tube| {
            tube.hardest_skill()
                .is_some_and(|s| s.difficulty <= MAX_LEVEL_TO_BE_AN_EASY_TUBE)
        })
        .flat_map(|tube| tube.skills.iter().map(|s| s.id.as_str()))
        .collect();

    let from_easy_tubes: Vec<SkillCandidate> = skills
        .iter()
        .filter(|s| easy_skill_ids.contains(s.id.as_str()))
        .cloned()
        .collect();

    if from_easy_tubes.is_empty() {
        skills
    } else {
        from_easy_tubes
    }
}

fn remove_timed_skills_if_needed(remove: bool, skills: Vec<SkillCandidate>) -> Vec<SkillCandidate> {
    if !remove {
        return skills;
    }
    let not_timed: Vec<SkillCandidate> = skills.iter().filter(|s| !s.timed).cloned().collect();
    if not_timed.is_empty() {
        skills
    } else {
        not_timed
    }
}

fn focus_on_default_level(skills: Vec<SkillCandidate>) -> Vec<SkillCandidate> {
    let distance = |s: &SkillCandidate| s.difficulty.abs_diff(DEFAULT_LEVEL_FOR_FIRST_CHALLENGE);
    let Some(nearest) = skills.iter().map(distance).min() else {
        return skills;
    };
    skills.into_iter().filter(|s| distance(s) == nearest).collect()
}

fn remove_too_difficult_skills(predicted_level: f64, skills: Vec<SkillCandidate>) -> Vec<SkillCandidate> {
    skills
        .into_iter()
        .filter(|s| f64::from(s.difficulty) <= predicted_level + MAX_DIFF_BETWEEN_USER_LEVEL_AND_SKILL_LEVEL)
        .collect()
}

pub fn filtered_skills_for_first_challenge(
    tested_skills: &HashSet<&str>,
    tubes: &[Tube],
    target_skills: &[SkillCandidate],
) -> (Vec<SkillCandidate>, FilterCounts) {
    let mut counts = FilterCounts::default();

    let skills = playable_skills(target_skills);
    counts.playable = skills.len();
    let skills = untested_skills(tested_skills, skills);
    counts.untested = skills.len();
    let skills = keep_skills_from_easy_tubes(tubes, skills);
    counts.from_easy_tubes = skills.len();
    let skills = remove_timed_skills_if_needed(true, skills);
    counts.timing = skills.len();
    let skills = focus_on_default_level(skills);
    counts.level = skills.len();

    (skills, counts)
}

pub fn filtered_skills_for_next_challenge(
    tested_skills: &HashSet<&str>,
    tubes: &[Tube],
    predicted_level: f64,
    is_last_challenge_timed: bool,
    target_skills: &[SkillCandidate],
) -> (Vec<SkillCandidate>, FilterCounts) {
    let mut counts = FilterCounts::default();

    let skills = playable_skills(target_skills);
    counts.playable = skills.len();
    let skills = untested_skills(tested_skills, skills);
    counts.untested = skills.len();
    let skills = keep_skills_from_easy_tubes(tubes, skills);
    counts.from_easy_tubes = skills.len();
    let skills = remove_timed_skills_if_needed(is_last_challenge_timed, skills);
    counts.timing = skills.len();
    let skills = remove_too_difficult_skills(predicted_level, skills);
    counts.level = skills.len();

    (skills, counts)
}
