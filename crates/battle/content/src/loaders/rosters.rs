//! Roster loader.
//!
//! Turns character and faction templates into a [`BattleState`] ready for
//! [`Combat::begin_battle`](battle_core::Combat::begin_battle).

use std::path::Path;

use battle_core::{
    Allegiance, BattleState, Character, CharacterId, EquipmentId, Faction, FactionId, SkillId,
    SkillRegistry,
};
use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentCatalog;
use crate::loaders::{LoadResult, read_file};

const EMBEDDED_ROSTERS: &str = include_str!("../../data/rosters.ron");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub id: CharacterId,
    pub name: String,
    pub max_hp: u32,
    pub speed: i32,
    #[serde(default)]
    pub skills: Vec<SkillId>,
    #[serde(default)]
    pub equipment: Vec<EquipmentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionTemplate {
    pub id: FactionId,
    pub name: String,
    pub allegiance: Allegiance,
    /// Character template ids in member order.
    pub members: Vec<CharacterId>,
}

/// Roster catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterCatalog {
    pub characters: Vec<CharacterTemplate>,
    pub factions: Vec<FactionTemplate>,
}

impl RosterCatalog {
    pub fn character(&self, id: &CharacterId) -> Option<&CharacterTemplate> {
        self.characters.iter().find(|c| &c.id == id)
    }

    pub fn faction(&self, id: &FactionId) -> Option<&FactionTemplate> {
        self.factions.iter().find(|f| &f.id == id)
    }

    /// Assembles the named factions, in the given order, into a fresh battle state.
    ///
    /// Equipment is carried but not subscribed; `begin_battle` attaches it to
    /// the battle's bus.
    pub fn assemble(
        &self,
        factions: &[FactionId],
        equipment: &EquipmentCatalog,
    ) -> LoadResult<BattleState> {
        let mut assembled = Vec::with_capacity(factions.len());
        for faction_id in factions {
            let template = self
                .faction(faction_id)
                .ok_or_else(|| anyhow::anyhow!("Unknown faction '{}' in roster", faction_id))?;

            let mut members = Vec::with_capacity(template.members.len());
            for member in &template.members {
                let character = self.character(member).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Faction '{}' lists unknown character '{}'",
                        faction_id,
                        member
                    )
                })?;
                members.push(Self::instantiate(character, equipment)?);
            }
            assembled.push(Faction::new(
                template.id.clone(),
                template.allegiance,
                template.name.clone(),
                members,
            ));
        }

        let state = BattleState::new(assembled);
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = state.characters().find(|c| !seen.insert(c.id.clone())) {
            anyhow::bail!("Character '{}' appears in more than one faction", duplicate.id);
        }
        Ok(state)
    }

    /// Every skill id referenced by a template that `registry` cannot resolve.
    pub fn dangling_skills<'a>(&'a self, registry: &'a SkillRegistry) -> Vec<(&'a CharacterId, &'a SkillId)> {
        self.characters
            .iter()
            .flat_map(|c| c.skills.iter().map(move |s| (&c.id, s)))
            .filter(|(_, skill)| !registry.contains(skill))
            .collect()
    }

    fn instantiate(template: &CharacterTemplate, equipment: &EquipmentCatalog) -> LoadResult<Character> {
        let mut character = Character::new(
            template.id.clone(),
            template.name.clone(),
            template.max_hp,
            template.speed,
        )
        .with_skills(template.skills.iter().cloned());

        for item_id in &template.equipment {
            let item = equipment.create(item_id).ok_or_else(|| {
                anyhow::anyhow!(
                    "Character '{}' carries unknown equipment '{}'",
                    template.id,
                    item_id
                )
            })?;
            character = character.with_item(item);
        }
        Ok(character)
    }
}

/// Loader for roster catalogs from RON files.
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<RosterCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// The rosters shipped with the crate.
    pub fn embedded() -> LoadResult<RosterCatalog> {
        Self::parse(EMBEDDED_ROSTERS)
    }

    fn parse(content: &str) -> LoadResult<RosterCatalog> {
        let catalog: RosterCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster catalog RON: {}", e))?;
        Ok(catalog)
    }
}
