//! Manual targeting across the async boundary.
//!
//! The turn worker runs on the blocking pool. When a player-controlled actor
//! needs a target, [`ChannelTargeter`] sends a [`PendingChoice`] to the
//! session owner and parks the worker until the reply arrives.
use async_trait::async_trait;
use battle_core::{CharacterId, TargetRequest, TargetRequester};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A manual-target request waiting for an answer.
///
/// Dropping it without answering cancels the skill.
#[derive(Debug)]
pub struct PendingChoice {
    request: TargetRequest,
    reply: oneshot::Sender<Option<CharacterId>>,
}

impl PendingChoice {
    pub fn request(&self) -> &TargetRequest {
        &self.request
    }

    pub fn candidates(&self) -> &[CharacterId] {
        &self.request.candidates
    }

    /// Resumes the turn with `target`.
    pub fn choose(self, target: CharacterId) {
        self.respond(Some(target));
    }

    /// Resumes the turn with the skill skipped.
    pub fn cancel(self) {
        self.respond(None);
    }

    fn respond(self, answer: Option<CharacterId>) {
        if self.reply.send(answer).is_err() {
            debug!(target: "battle::runtime", skill = %self.request.skill, "choice answered after the turn gave up");
        }
    }
}

/// Blocking [`TargetRequester`] backed by an mpsc channel.
pub struct ChannelTargeter {
    tx: mpsc::Sender<PendingChoice>,
}

impl ChannelTargeter {
    pub fn new(tx: mpsc::Sender<PendingChoice>) -> Self {
        Self { tx }
    }
}

impl TargetRequester for ChannelTargeter {
    /// Must run outside the async executor (e.g. inside `spawn_blocking`).
    fn request_target(&mut self, request: &TargetRequest) -> Option<CharacterId> {
        let (reply, answer) = oneshot::channel();
        let pending = PendingChoice {
            request: request.clone(),
            reply,
        };
        if self.tx.blocking_send(pending).is_err() {
            warn!(
                target: "battle::runtime",
                actor = %request.actor,
                skill = %request.skill,
                "choice channel closed; cancelling"
            );
            return None;
        }
        answer.blocking_recv().ok().flatten()
    }
}

/// Async source of manual-target answers.
///
/// Implementations can wrap human input, scripted fixtures or AI policies.
#[async_trait]
pub trait ChoiceProvider: Send + Sync {
    /// Returns a candidate, or `None` to skip the skill.
    async fn choose(&self, request: &TargetRequest) -> Option<CharacterId>;
}

/// Always picks the first candidate. Useful for simulations and tests.
pub struct FirstCandidateProvider;

#[async_trait]
impl ChoiceProvider for FirstCandidateProvider {
    async fn choose(&self, request: &TargetRequest) -> Option<CharacterId> {
        request.candidates.first().cloned()
    }
}

/// Answers every choice on `choices` with `provider` until the session closes.
pub fn serve_choices<P>(mut choices: mpsc::Receiver<PendingChoice>, provider: P) -> JoinHandle<()>
where
    P: ChoiceProvider + 'static,
{
    tokio::spawn(async move {
        while let Some(choice) = choices.recv().await {
            match provider.choose(choice.request()).await {
                Some(target) => choice.choose(target),
                None => choice.cancel(),
            }
        }
    })
}
