use super::{Character, CharacterId, FactionId};

/// Who drives a faction's manual choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Allegiance {
    /// Manual-targeting skills ask the boundary for a choice.
    Player,
    /// Every choice is made by the selection strategy.
    Computer,
}

/// An owned, ordered group of characters sharing allegiance.
#[derive(Clone, Debug, PartialEq)]
pub struct Faction {
    pub id: FactionId,
    pub allegiance: Allegiance,
    pub name: String,
    pub characters: Vec<Character>,
}

impl Faction {
    /// Creates a faction and claims every member.
    pub fn new(
        id: impl Into<FactionId>,
        allegiance: Allegiance,
        name: impl Into<String>,
        characters: Vec<Character>,
    ) -> Self {
        let mut faction = Self {
            id: id.into(),
            allegiance,
            name: name.into(),
            characters: Vec::with_capacity(characters.len()),
        };
        for character in characters {
            faction.add_character(character);
        }
        faction
    }

    pub fn add_character(&mut self, mut character: Character) {
        character.faction = self.id.clone();
        self.characters.push(character);
    }

    /// Members with hp above zero, in list order.
    pub fn living_members(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_alive())
    }

    pub fn get_character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| &c.id == id)
    }

    pub fn get_character_mut(&mut self, id: &CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| &c.id == id)
    }

    pub fn is_player(&self) -> bool {
        self.allegiance == Allegiance::Player
    }

    /// True once no member is alive.
    pub fn is_wiped_out(&self) -> bool {
        self.living_members().next().is_none()
    }
}
