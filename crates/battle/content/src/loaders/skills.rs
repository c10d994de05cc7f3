//! Skill catalog loader.

use std::path::Path;

use battle_core::{Skill, SkillRegistry};
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_SKILLS: &str = include_str!("../../data/skills.ron");

/// Loader for skill descriptors from RON files.
///
/// RON format: `Vec<Skill>`. Duplicate ids are rejected.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<SkillRegistry> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// The catalog shipped with the crate.
    pub fn embedded() -> LoadResult<SkillRegistry> {
        Self::parse(EMBEDDED_SKILLS)
    }

    fn parse(content: &str) -> LoadResult<SkillRegistry> {
        let skills: Vec<Skill> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;

        let mut registry = SkillRegistry::default();
        for skill in skills {
            let id = skill.id.clone();
            if registry.insert(skill).is_some() {
                anyhow::bail!("Duplicate skill id '{}' in skill catalog", id);
            }
        }
        debug!(target: "battle::content", skills = registry.len(), "skill catalog loaded");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{MaxTargets, ScriptedSkill, SkillEffect, SkillId, TargetMode, Topic};

    #[test]
    fn embedded_catalog_parses() {
        let registry = SkillLoader::embedded().unwrap();
        assert_eq!(registry.len(), 14);

        let fireball = registry.get(&SkillId::new("fireball")).unwrap();
        assert_eq!(fireball.targeting.mode, TargetMode::Manual);
        assert!(fireball.is_active_phase());

        let breath = registry.get(&SkillId::new("dragon_breath")).unwrap();
        assert_eq!(breath.targeting.max, MaxTargets::Unbounded);
        assert_eq!(breath.effect, SkillEffect::Scripted(ScriptedSkill::DragonBreath));

        let counter = registry.get(&SkillId::new("counter_strike")).unwrap();
        assert!(counter.is_triggered_by(&Topic::TAKE_DAMAGE));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.ron");
        let entry = r#"(id: "jab", name: "Jab", category: Offensive, effect: Generated((damage: Some((amount: 1)))))"#;
        std::fs::write(&path, format!("[{entry}, {entry}]")).unwrap();

        let err = SkillLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("Duplicate skill id 'jab'"));
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.ron");
        std::fs::write(&path, "[(id: \"jab\")]").unwrap();

        let err = SkillLoader::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse skill catalog RON"));
    }
}
