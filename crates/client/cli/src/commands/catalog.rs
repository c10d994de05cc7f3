//! List the loaded content.

use anyhow::Result;
use battle_core::{Skill, SkillTrigger};
use clap::Parser;
use console::style;

use crate::content::ContentArgs;

/// List factions and skills
#[derive(Parser)]
pub struct Catalog {
    #[command(flatten)]
    content: ContentArgs,
}

impl Catalog {
    pub fn execute(self) -> Result<()> {
        let content = self.content.load()?;

        println!("{}", style("Factions:").bold().yellow());
        for faction in &content.rosters.factions {
            println!(
                "  {} [{}] ({})",
                style(&faction.name).bold(),
                faction.id,
                faction.allegiance
            );
            for member in &faction.members {
                let Some(character) = content.rosters.character(member) else {
                    continue;
                };
                let skills: Vec<&str> = character.skills.iter().map(|s| s.as_str()).collect();
                println!(
                    "    {} - HP: {}, Speed: {}, Skills: {}",
                    character.name,
                    character.max_hp,
                    character.speed,
                    skills.join(", ")
                );
                if !character.equipment.is_empty() {
                    let items: Vec<&str> =
                        character.equipment.iter().map(|e| e.as_str()).collect();
                    println!("      Equipment: {}", items.join(", "));
                }
            }
        }
        println!();

        println!("{}", style("Skills:").bold().yellow());
        let mut ids: Vec<_> = content.registry.ids().collect();
        ids.sort();
        for id in ids {
            if let Some(skill) = content.registry.get(id) {
                println!("  {}", describe(skill));
            }
        }
        Ok(())
    }
}

fn describe(skill: &Skill) -> String {
    let trigger = match &skill.trigger {
        SkillTrigger::ActivePhase => "active".to_owned(),
        SkillTrigger::Event(topic) => format!("on {topic}"),
    };
    format!(
        "{:<18} {:<20} {:<10} {}",
        skill.id.as_str(),
        skill.name,
        skill.category.to_string(),
        trigger
    )
}
