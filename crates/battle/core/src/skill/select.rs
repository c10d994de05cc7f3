//! Target selection strategies.
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::state::{BattleState, CharacterId};

use super::SelectionStrategy;

/// Chooses at most `max` targets from `candidates`.
///
/// When every candidate fits, all are returned in candidate order.
pub fn select_targets(
    strategy: SelectionStrategy,
    mut candidates: Vec<CharacterId>,
    max: usize,
    state: &BattleState,
    rng: &mut ChaCha8Rng,
) -> Vec<CharacterId> {
    if candidates.len() <= max {
        return candidates;
    }

    match strategy {
        SelectionStrategy::LowestHp => {
            // Stable: equal hp keeps candidate order.
            candidates.sort_by_key(|id| state.character(id).map_or(u32::MAX, |c| c.hp));
        }
        SelectionStrategy::Random => candidates.shuffle(rng),
    }
    candidates.truncate(max);
    candidates
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::state::{Allegiance, Character, Faction};

    fn state() -> BattleState {
        BattleState::new(vec![Faction::new(
            "enemies",
            Allegiance::Computer,
            "Enemies",
            vec![
                Character::new("a", "A", 10, 1).with_hp(7),
                Character::new("b", "B", 10, 1).with_hp(3),
                Character::new("c", "C", 10, 1).with_hp(5),
                Character::new("d", "D", 10, 1).with_hp(3),
            ],
        )])
    }

    fn ids(names: &[&str]) -> Vec<CharacterId> {
        names.iter().map(|n| CharacterId::new(*n)).collect()
    }

    #[test]
    fn all_candidates_selected_when_they_fit() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let chosen = select_targets(
            SelectionStrategy::Random,
            ids(&["a", "b"]),
            2,
            &state(),
            &mut rng,
        );
        assert_eq!(chosen, ids(&["a", "b"]));
    }

    #[test]
    fn lowest_hp_is_deterministic_with_stable_ties() {
        let state = state();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..3 {
            let chosen = select_targets(
                SelectionStrategy::LowestHp,
                ids(&["a", "b", "c", "d"]),
                3,
                &state,
                &mut rng,
            );
            assert_eq!(chosen, ids(&["b", "d", "c"]));
        }
    }

    #[test]
    fn random_selects_exactly_max_distinct() {
        let state = state();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let chosen = select_targets(
            SelectionStrategy::Random,
            ids(&["a", "b", "c", "d"]),
            2,
            &state,
            &mut rng,
        );
        assert_eq!(chosen.len(), 2);
        assert_ne!(chosen[0], chosen[1]);
    }
}
