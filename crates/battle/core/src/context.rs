//! Per-invocation combat context and the manual targeting seam.
use crate::bus::Event;
use crate::error::CombatError;
use crate::state::{BattleState, CharacterId, FactionId, SkillId};

/// Whether the acting character's faction owns the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatMode {
    Offensive,
    Defensive,
}

/// Ordering and trigger fields merged into a context.
#[derive(Clone, Debug, Default)]
pub struct ContextExtras {
    pub is_first: bool,
    pub rank: usize,
    /// The event a passive skill is reacting to.
    pub trigger: Option<Event>,
}

/// Ephemeral view handed to a skill for one invocation.
///
/// Memory and dice history are read from the turn scope's draft state, so
/// the context only carries what is specific to this actor and moment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatContext {
    pub dice: u8,
    pub actor: CharacterId,
    pub actor_faction: FactionId,
    pub active_faction: FactionId,
    pub mode: CombatMode,
    /// Living members of the actor's faction, the actor included.
    pub allies: Vec<CharacterId>,
    /// Living members of every other faction.
    pub enemies: Vec<CharacterId>,
    pub is_first: bool,
    pub rank: usize,
    /// Triggering payload for passive dispatch. Effects may rewrite it.
    pub trigger: Option<Event>,
}

impl CombatContext {
    /// Builds the context for `actor` from the full faction list.
    pub fn build(
        state: &BattleState,
        active_faction: &FactionId,
        actor: &CharacterId,
        dice: u8,
        extras: ContextExtras,
    ) -> Result<Self, CombatError> {
        let character = state.require(actor)?;
        state.require_faction(active_faction)?;
        let own = state.require_faction(&character.faction)?;

        let allies = own.living_members().map(|c| c.id.clone()).collect();
        let enemies = state
            .factions
            .iter()
            .filter(|f| f.id != own.id)
            .flat_map(|f| f.living_members())
            .map(|c| c.id.clone())
            .collect();

        let mode = if &own.id == active_faction {
            CombatMode::Offensive
        } else {
            CombatMode::Defensive
        };

        Ok(Self {
            dice,
            actor: actor.clone(),
            actor_faction: own.id.clone(),
            active_faction: active_faction.clone(),
            mode,
            allies,
            enemies,
            is_first: extras.is_first,
            rank: extras.rank,
            trigger: extras.trigger,
        })
    }

    pub fn is_enemy(&self, id: &CharacterId) -> bool {
        self.enemies.contains(id)
    }

    /// True when the triggering event lists the actor among its targets.
    pub fn is_targeted(&self) -> bool {
        self.trigger
            .as_ref()
            .is_some_and(|e| e.targets().contains(&self.actor))
    }
}

/// A pending manual choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetRequest {
    pub actor: CharacterId,
    pub skill: SkillId,
    pub candidates: Vec<CharacterId>,
}

/// Boundary that answers manual targeting requests.
///
/// Returning `None` cancels the skill for this turn. Implementations may block.
pub trait TargetRequester {
    fn request_target(&mut self, request: &TargetRequest) -> Option<CharacterId>;
}

/// Requester that cancels every manual choice.
#[derive(Clone, Copy, Debug, Default)]
pub struct CancelAll;

impl TargetRequester for CancelAll {
    fn request_target(&mut self, _request: &TargetRequest) -> Option<CharacterId> {
        None
    }
}

/// Requester that always picks the first candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstCandidate;

impl TargetRequester for FirstCandidate {
    fn request_target(&mut self, request: &TargetRequest) -> Option<CharacterId> {
        request.candidates.first().cloned()
    }
}

impl<F> TargetRequester for F
where
    F: FnMut(&TargetRequest) -> Option<CharacterId>,
{
    fn request_target(&mut self, request: &TargetRequest) -> Option<CharacterId> {
        self(request)
    }
}
