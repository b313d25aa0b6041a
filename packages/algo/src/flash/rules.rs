//! Challenge selection rules
//!
//! Each rule narrows the pool of challenges still eligible for the next
//! question. Rules run in order and every rule receives the previous rule's
//! output; an empty pool simply flows through to the end.

use std::collections::{HashMap, HashSet};

use crate::flash::config::FlashAssessmentAlgorithmConfiguration;
use crate::types::{Answer, Challenge};

/// Per-pass inputs shared by every rule
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub all_answers: &'a [Answer],
    pub all_challenges: &'a [Challenge],
    pub limit_to_one_question_per_tube: bool,
    pub enable_passage_by_all_competences: bool,
    pub forced_competences: Vec<String>,
    pub warm_up_length: usize,
    answered_challenges: Vec<&'a Challenge>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        all_answers: &'a [Answer],
        all_challenges: &'a [Challenge],
        configuration: &FlashAssessmentAlgorithmConfiguration,
    ) -> Self {
        let challenges_by_id: HashMap<&str, &'a Challenge> =
            all_challenges.iter().map(|c| (c.id.as_str(), c)).collect();
        let answered_challenges = all_answers
            .iter()
            .filter_map(|answer| challenges_by_id.get(answer.challenge_id.as_str()).copied())
            .collect();

        Self {
            all_answers,
            all_challenges,
            limit_to_one_question_per_tube: configuration.limit_to_one_question_per_tube,
            enable_passage_by_all_competences: configuration.enable_passage_by_all_competences,
            forced_competences: configuration.forced_competences.clone(),
            warm_up_length: configuration.warm_up_length,
            answered_challenges,
        }
    }

    /// Answered challenges found in the pool, in answer order
    pub fn answered_challenges(&self) -> &[&'a Challenge] {
        &self.answered_challenges
    }

    fn answered_competences(&self) -> HashSet<&'a str> {
        self.answered_challenges
            .iter()
            .map(|c| c.competence_id.as_str())
            .collect()
    }
}

pub trait ChallengeSelectionRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_applicable(&self, context: &RuleContext<'_>) -> bool;

    fn apply<'a>(&self, context: &RuleContext<'a>, available: Vec<&'a Challenge>) -> Vec<&'a Challenge>;
}

// ==================== Rules ====================

/// Once a tube has been answered, none of its challenges come back
#[derive(Debug, Clone, Copy, Default)]
pub struct OneQuestionPerTubeRule;

impl ChallengeSelectionRule for OneQuestionPerTubeRule {
    fn name(&self) -> &'static str {
        "one_question_per_tube"
    }

    fn is_applicable(&self, context: &RuleContext<'_>) -> bool {
        context.limit_to_one_question_per_tube
    }

    fn apply<'a>(&self, context: &RuleContext<'a>, available: Vec<&'a Challenge>) -> Vec<&'a Challenge> {
        let answered_tubes: HashSet<&str> = context
            .answered_challenges()
            .iter()
            .map(|c| c.tube_id.as_str())
            .collect();
        available
            .into_iter()
            .filter(|c| !answered_tubes.contains(c.tube_id.as_str()))
            .collect()
    }
}

/// Never test the same skill twice, nor present an answered challenge again
#[derive(Debug, Clone, Copy, Default)]
pub struct NonAnsweredSkillsRule;

impl ChallengeSelectionRule for NonAnsweredSkillsRule {
    fn name(&self) -> &'static str {
        "non_answered_skills"
    }

    fn is_applicable(&self, _context: &RuleContext<'_>) -> bool {
        true
    }

    fn apply<'a>(&self, context: &RuleContext<'a>, available: Vec<&'a Challenge>) -> Vec<&'a Challenge> {
        let answered_skills: HashSet<&str> = context
            .answered_challenges()
            .iter()
            .map(|c| c.skill_id.as_str())
            .collect();
        let answered_ids: HashSet<&str> = context
            .all_answers
            .iter()
            .map(|a| a.challenge_id.as_str())
            .collect();
        available
            .into_iter()
            .filter(|c| !answered_skills.contains(c.skill_id.as_str()))
            .filter(|c| !answered_ids.contains(c.id.as_str()))
            .collect()
    }
}

/// Visit every competence once before coming back to any of them
#[derive(Debug, Clone, Copy, Default)]
pub struct PassageByAllCompetencesRule;

impl ChallengeSelectionRule for PassageByAllCompetencesRule {
    fn name(&self) -> &'static str {
        "passage_by_all_competences"
    }

    fn is_applicable(&self, context: &RuleContext<'_>) -> bool {
        context.enable_passage_by_all_competences
    }

    fn apply<'a>(&self, context: &RuleContext<'a>, available: Vec<&'a Challenge>) -> Vec<&'a Challenge> {
        let answered_competences = context.answered_competences();
        let not_yet_sampled: Vec<&'a Challenge> = available
            .iter()
            .copied()
            .filter(|c| !answered_competences.contains(c.competence_id.as_str()))
            .collect();

        if not_yet_sampled.is_empty() {
            available
        } else {
            not_yet_sampled
        }
    }
}

/// After warm-up, keep to the forced competences until each one is answered
#[derive(Debug, Clone, Copy, Default)]
pub struct ForcedCompetencesRule;

impl ChallengeSelectionRule for ForcedCompetencesRule {
    fn name(&self) -> &'static str {
        "forced_competences"
    }

    fn is_applicable(&self, context: &RuleContext<'_>) -> bool {
        !context.forced_competences.is_empty() && context.all_answers.len() >= context.warm_up_length
    }

    fn apply<'a>(&self, context: &RuleContext<'a>, available: Vec<&'a Challenge>) -> Vec<&'a Challenge> {
        let answered_competences = context.answered_competences();
        let remaining: HashSet<&str> = context
            .forced_competences
            .iter()
            .map(String::as_str)
            .filter(|id| !answered_competences.contains(id))
            .collect();
        if remaining.is_empty() {
            return available;
        }

        let forced: Vec<&'a Challenge> = available
            .iter()
            .copied()
            .filter(|c| remaining.contains(c.competence_id.as_str()))
            .collect();

        if forced.is_empty() {
            available
        } else {
            forced
        }
    }
}

// ==================== Engine ====================

pub struct RuleEngine {
    rules: Vec<Box<dyn ChallengeSelectionRule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn ChallengeSelectionRule>>) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self::new(vec![
            Box::new(OneQuestionPerTubeRule),
            Box::new(NonAnsweredSkillsRule),
            Box::new(PassageByAllCompetencesRule),
            Box::new(ForcedCompetencesRule),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Filters the selectable challenges of the context through every applicable rule
    pub fn execute<'a>(&self, context: &RuleContext<'a>) -> Vec<&'a Challenge> {
        let initial: Vec<&'a Challenge> = context
            .all_challenges
            .iter()
            .filter(|c| c.status.is_selectable() && c.irt_params().is_some())
            .collect();

        self.rules.iter().fold(initial, |pool, rule| {
            if !rule.is_applicable(context) {
                return pool;
            }
            let before = pool.len();
            let filtered = rule.apply(context, pool);
            tracing::trace!(rule = rule.name(), before, after = filtered.len(), "selection rule applied");
            filtered
        })
    }
}
