//! Terminal prompt for manual targeting.

use std::collections::HashMap;

use async_trait::async_trait;
use battle_core::{BattleState, CharacterId, TargetRequest};
use battle_runtime::ChoiceProvider;
use console::{Term, style};
use tracing::warn;

/// Asks the player on the terminal which candidate a manual skill should hit.
///
/// An empty answer (or closed stdin) skips the skill.
pub struct PromptProvider {
    names: HashMap<CharacterId, String>,
}

impl PromptProvider {
    pub fn new(roster: &BattleState) -> Self {
        Self {
            names: roster
                .characters()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
        }
    }

    fn name<'a>(&'a self, id: &'a CharacterId) -> &'a str {
        self.names.get(id).map_or(id.as_str(), String::as_str)
    }

    fn render(&self, request: &TargetRequest) -> Vec<String> {
        let mut lines = vec![format!(
            "{} {} uses {}",
            style("Choose a target:").bold().cyan(),
            self.name(&request.actor),
            request.skill
        )];
        lines.extend(
            request
                .candidates
                .iter()
                .enumerate()
                .map(|(i, id)| format!("  [{}] {}", i + 1, self.name(id))),
        );
        lines
    }
}

#[async_trait]
impl ChoiceProvider for PromptProvider {
    async fn choose(&self, request: &TargetRequest) -> Option<CharacterId> {
        let lines = self.render(request);
        let candidates = request.candidates.clone();
        tokio::task::spawn_blocking(move || ask(&lines, &candidates))
            .await
            .unwrap_or_else(|err| {
                warn!(target: "battle::runtime", %err, "prompt task failed, skipping");
                None
            })
    }
}

fn ask(lines: &[String], candidates: &[CharacterId]) -> Option<CharacterId> {
    let term = Term::stderr();
    for line in lines {
        term.write_line(line).ok()?;
    }
    loop {
        term.write_str("> ").ok()?;
        let answer = term.read_line().ok()?;
        match parse_answer(&answer, candidates.len()) {
            Answer::Skip => return None,
            Answer::Pick(index) => return candidates.get(index).cloned(),
            Answer::Invalid => {
                term.write_line(&format!(
                    "{} enter 1-{} or leave empty to skip",
                    style("?").yellow(),
                    candidates.len()
                ))
                .ok()?;
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Skip,
    Pick(usize),
    Invalid,
}

fn parse_answer(answer: &str, count: usize) -> Answer {
    let answer = answer.trim();
    if answer.is_empty() {
        return Answer::Skip;
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Answer::Pick(n - 1),
        _ => Answer::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_one_based() {
        assert_eq!(parse_answer("1", 2), Answer::Pick(0));
        assert_eq!(parse_answer(" 2\n", 2), Answer::Pick(1));
        assert_eq!(parse_answer("3", 2), Answer::Invalid);
        assert_eq!(parse_answer("0", 2), Answer::Invalid);
        assert_eq!(parse_answer("dragon", 2), Answer::Invalid);
        assert_eq!(parse_answer("   ", 2), Answer::Skip);
    }
}
