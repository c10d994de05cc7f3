//! Content loading shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{ContentFactory, EquipmentCatalog, RosterCatalog};
use battle_core::{Allegiance, BattleState, FactionId, SkillRegistry};
use battle_runtime::RuntimeConfig;
use clap::Args;
use tracing::debug;

#[derive(Args)]
pub struct ContentArgs {
    /// Directory holding config.toml, skills.ron and rosters.ron
    /// (defaults to the built-in catalogs)
    #[arg(short, long, value_name = "DIR", env = "BATTLE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Every catalog a battle needs, validated against each other.
pub struct Content {
    pub registry: Arc<SkillRegistry>,
    pub rosters: RosterCatalog,
    pub equipment: EquipmentCatalog,
    pub config: RuntimeConfig,
}

impl ContentArgs {
    pub fn load(&self) -> Result<Content> {
        let factory = match &self.data_dir {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::embedded(),
        };
        let source = factory
            .data_dir()
            .map_or_else(|| "built-in".to_owned(), |dir| dir.display().to_string());

        let registry = factory
            .load_skills()
            .with_context(|| format!("Failed to load skills ({source})"))?;
        let rosters = factory
            .load_rosters()
            .with_context(|| format!("Failed to load rosters ({source})"))?;
        let battle = factory
            .load_config()
            .with_context(|| format!("Failed to load config ({source})"))?;

        if let Some((character, skill)) = rosters.dangling_skills(&registry).first() {
            anyhow::bail!("Character '{}' references unknown skill '{}'", character, skill);
        }

        debug!(
            target: "battle::content",
            %source,
            skills = registry.len(),
            characters = rosters.characters.len(),
            factions = rosters.factions.len(),
            "content loaded"
        );

        Ok(Content {
            registry: Arc::new(registry),
            rosters,
            equipment: EquipmentCatalog::builtin(),
            config: RuntimeConfig::new(battle).with_env(),
        })
    }
}

impl Content {
    pub fn assemble(&self, factions: &[FactionId]) -> Result<BattleState> {
        self.rosters.assemble(factions, &self.equipment)
    }

    /// Computer-controlled factions in catalog order.
    pub fn computer_factions(&self) -> Vec<FactionId> {
        self.rosters
            .factions
            .iter()
            .filter(|f| f.allegiance == Allegiance::Computer)
            .map(|f| f.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> Content {
        ContentArgs { data_dir: None }.load().unwrap()
    }

    #[test]
    fn builtin_content_loads() {
        let content = builtin();
        assert!(content.registry.contains(&"fireball".into()));
        assert_eq!(
            content.computer_factions(),
            vec![FactionId::new("rebels"), FactionId::new("dragon_lair")]
        );
    }

    #[test]
    fn dangling_skill_references_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        std::fs::write(dir.path().join("skills.ron"), "[]").unwrap();
        std::fs::write(
            dir.path().join("rosters.ron"),
            r#"(
                characters: [(id: "mage", name: "Mage", max_hp: 3, speed: 2, skills: ["blink"])],
                factions: [],
            )"#,
        )
        .unwrap();

        let args = ContentArgs {
            data_dir: Some(dir.path().to_path_buf()),
        };
        let err = args.load().err().unwrap();
        assert!(err.to_string().contains("unknown skill 'blink'"));
    }
}
