use std::collections::HashMap;

use crate::bus::Topic;
use crate::state::SkillId;

use super::{Skill, SkillTrigger};

/// Skill catalog built once at load time and shared across battles.
#[derive(Clone, Debug, Default)]
pub struct SkillRegistry {
    skills: HashMap<SkillId, Skill>,
}

impl SkillRegistry {
    /// Builds a registry. Later entries replace earlier ones with the same id.
    pub fn new(skills: impl IntoIterator<Item = Skill>) -> Self {
        Self {
            skills: skills.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn insert(&mut self, skill: Skill) -> Option<Skill> {
        self.skills.insert(skill.id.clone(), skill)
    }

    pub fn get(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.get(id)
    }

    pub fn contains(&self, id: &SkillId) -> bool {
        self.skills.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &SkillId> + '_ {
        self.skills.keys()
    }

    /// Passive trigger topic of a skill, if it has one.
    pub fn trigger_of(&self, id: &SkillId) -> Option<&Topic> {
        match &self.skills.get(id)?.trigger {
            SkillTrigger::Event(topic) => Some(topic),
            SkillTrigger::ActivePhase => None,
        }
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
