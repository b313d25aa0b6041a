use serde::{Deserialize, Serialize};

use crate::types::{Challenge, Skill};

/// Target skill enriched with what the content offers in the current locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCandidate {
    pub id: String,
    pub name: String,
    pub difficulty: u8,
    pub tube_name: String,
    pub playable: bool,
    pub timed: bool,
    pub challenge_ids: Vec<String>,
}

impl SkillCandidate {
    pub fn from_skill(skill: &Skill, challenges: &[Challenge], locale: &str) -> Self {
        let playable: Vec<&Challenge> = challenges
            .iter()
            .filter(|c| c.skill_id == skill.id && c.is_playable_in(locale))
            .collect();

        Self {
            id: skill.id.clone(),
            name: skill.name.clone(),
            difficulty: skill.difficulty,
            tube_name: skill.tube_name.clone(),
            playable: !playable.is_empty(),
            timed: playable.first().is_some_and(|c| c.is_timed()),
            challenge_ids: playable.iter().map(|c| c.id.clone()).collect(),
        }
    }
}

/// Skills of one topic, ordered by difficulty
#[derive(Debug, Clone, PartialEq)]
pub struct Tube {
    pub name: String,
    pub skills: Vec<SkillCandidate>,
}

impl Tube {
    pub fn hardest_skill(&self) -> Option<&SkillCandidate> {
        self.skills.iter().max_by_key(|s| s.difficulty)
    }

    /// Skills validated along with `skill`, itself included
    pub fn easier_than<'t>(&'t self, skill: &'t SkillCandidate) -> impl Iterator<Item = &'t SkillCandidate> {
        self.skills
            .iter()
            .filter(move |s| s.difficulty <= skill.difficulty)
    }

    /// Skills invalidated along with `skill`, itself included
    pub fn harder_than<'t>(&'t self, skill: &'t SkillCandidate) -> impl Iterator<Item = &'t SkillCandidate> {
        self.skills
            .iter()
            .filter(move |s| s.difficulty >= skill.difficulty)
    }
}

/// Groups the playable skills by tube, keeping first-appearance order
pub fn group_by_tubes(skills: &[SkillCandidate]) -> Vec<Tube> {
    let mut tubes: Vec<Tube> = Vec::new();
    for skill in skills.iter().filter(|s| s.playable) {
        match tubes.iter_mut().find(|t| t.name == skill.tube_name) {
            Some(tube) => tube.skills.push(skill.clone()),
            None => tubes.push(Tube {
                name: skill.tube_name.clone(),
                skills: vec![skill.clone()],
            }),
        }
    }
    for tube in &mut tubes {
        tube.skills.sort_by_key(|s| s.difficulty);
    }
    tubes
}
