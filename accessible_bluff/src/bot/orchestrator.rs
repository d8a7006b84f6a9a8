//! Bot orchestrator: the only component that asks bots for decisions.

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::time::Duration;
use uuid::Uuid;

use super::{
    agent::{BotAgent, BotDecision},
    models::{BotConfig, BotDifficulty},
};
use crate::game::{
    ActionError, GameEngine,
    entities::{Action, ChallengeOutcome, GameStage, PlayerId, ResolvedAction},
};

/// A decision the orchestrator is waiting on. Only valid while the game and
/// action sequence it was issued for are still current.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecisionTicket {
    pub bot_id: PlayerId,
    pub game_id: Uuid,
    pub action_seq: u64,
    pub issued_at: DateTime<Utc>,
}

/// What happened when a bot's decision reached the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum BotMove {
    /// The decision was applied as made.
    Applied(ResolvedAction),
    /// The engine rejected the decision and the bot passed its turn instead.
    Passed {
        record: ResolvedAction,
        rejected: ActionError,
    },
    /// The engine rejected an off-turn decision. Nothing was applied.
    Dropped(ActionError),
}

impl BotMove {
    /// The applied action, if any.
    pub fn record(&self) -> Option<&ResolvedAction> {
        match self {
            BotMove::Applied(record) | BotMove::Passed { record, .. } => Some(record),
            BotMove::Dropped(_) => None,
        }
    }
}

/// Submit a bot's action, falling back to Pass when the engine rejects it
/// on the bot's own turn.
///
/// # Arguments
///
/// * `engine` - Engine to apply the action to
/// * `bot` - Acting bot
/// * `action` - The bot's decision
///
/// # Returns
///
/// * `Result<BotMove, ActionError>` - What was applied, or the error from the
///   fallback Pass if even that was refused
pub fn apply_bot_action(
    engine: &mut GameEngine,
    bot: &PlayerId,
    action: Action,
) -> Result<BotMove, ActionError> {
    let rejected = match engine.submit_action(bot, action) {
        Ok(record) => return Ok(BotMove::Applied(record)),
        Err(e) => e,
    };
    if engine.state().current_player().map(|p| &p.id) != Some(bot) {
        return Ok(BotMove::Dropped(rejected));
    }
    let record = engine.submit_action(bot, Action::Pass)?;
    Ok(BotMove::Passed { record, rejected })
}

/// Bot orchestrator for a single table
#[derive(Debug, Default)]
pub struct BotOrchestrator {
    bots: Vec<BotAgent>,

    /// At most one decision is in flight
    outstanding: Option<DecisionTicket>,

    /// Last action sequence an off-turn bot was consulted for
    consulted_seq: Option<u64>,
}

impl BotOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `count` bots named `bot-1`, `bot-2`, ...
    ///
    /// # Arguments
    ///
    /// * `difficulty` - Difficulty shared by every bot
    /// * `count` - Number of bots to create
    /// * `seed` - Base seed; bot `n` uses `seed + n`. `None` seeds from the OS
    ///
    /// # Returns
    ///
    /// * `Vec<BotConfig>` - Configs of the created bots, in seat order
    pub fn create_bots(
        &mut self,
        difficulty: BotDifficulty,
        count: usize,
        seed: Option<u64>,
    ) -> Vec<BotConfig> {
        let first = self.bots.len() + 1;
        (first..first + count)
            .map(|n| {
                let config =
                    BotConfig::numbered(n, difficulty, seed.map(|s| s.wrapping_add(n as u64)));
                let bot = BotAgent::new(config.clone());
                info!(
                    "Created {} ({}, {})",
                    bot.id(),
                    difficulty,
                    bot.personality().kind
                );
                self.bots.push(bot);
                config
            })
            .collect()
    }

    pub fn add_bot(&mut self, bot: BotAgent) {
        self.bots.push(bot);
    }

    pub fn bots(&self) -> &[BotAgent] {
        &self.bots
    }

    pub fn bot(&self, id: &PlayerId) -> Option<&BotAgent> {
        self.bots.iter().find(|b| b.id() == id)
    }

    fn bot_mut(&mut self, id: &PlayerId) -> Option<&mut BotAgent> {
        self.bots.iter_mut().find(|b| b.id() == id)
    }

    pub fn is_bot(&self, id: &PlayerId) -> bool {
        self.bot(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn outstanding(&self) -> Option<&DecisionTicket> {
        self.outstanding.as_ref()
    }

    /// Mirror an applied action to every bot, including the challenge
    /// resolution when there is one.
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine the action was applied to
    /// * `applied` - The action record returned by the engine
    pub fn mirror_state(&mut self, engine: &GameEngine, applied: &ResolvedAction) {
        let public = applied.to_public();
        for bot in &mut self.bots {
            let view = engine.view_for(Some(bot.id()));
            bot.observe(&view, &public);
        }
        if let Some(outcome) = applied.challenge_outcome() {
            self.update_with_challenge_result(outcome);
        }
    }

    /// Tell every bot, not only the two involved, how a challenge resolved.
    pub fn update_with_challenge_result(&mut self, outcome: &ChallengeOutcome) {
        for bot in &mut self.bots {
            bot.update_with_challenge_result(outcome);
        }
    }

    /// Pick the bot that should decide next and issue a ticket for it.
    ///
    /// The current actor is asked when it is a bot. Otherwise, while a
    /// challenge window is open, one eligible bot other than the placer is
    /// consulted once per placement. Nothing is issued while another ticket
    /// is outstanding.
    ///
    /// # Returns
    ///
    /// * `Option<DecisionTicket>` - Ticket to schedule, if any bot should act
    pub fn request_decision(&mut self, engine: &GameEngine) -> Option<DecisionTicket> {
        if self.outstanding.is_some() {
            return None;
        }
        let state = engine.state();
        if state.stage != GameStage::Playing {
            return None;
        }

        let bot_id = match state.current_player() {
            Some(current) if current.is_eligible() && self.is_bot(&current.id) => {
                current.id.clone()
            }
            _ => {
                if self.consulted_seq == Some(state.action_seq) {
                    return None;
                }
                let view = engine.view_for(None);
                let (placer, _, _) = view.pending_claim()?;
                let candidate = state
                    .players
                    .iter()
                    .filter(|p| p.is_eligible() && &p.id != placer)
                    .find(|p| self.is_bot(&p.id))?;
                self.consulted_seq = Some(state.action_seq);
                candidate.id.clone()
            }
        };

        let ticket = DecisionTicket {
            bot_id,
            game_id: state.game_id,
            action_seq: state.action_seq,
            issued_at: Utc::now(),
        };
        debug!(
            "Decision requested from {} at action {}",
            ticket.bot_id, ticket.action_seq
        );
        self.outstanding = Some(ticket.clone());
        Some(ticket)
    }

    /// Thinking time for the bot holding `ticket`.
    pub fn think_delay(&mut self, ticket: &DecisionTicket) -> Duration {
        self.bot_mut(&ticket.bot_id)
            .map_or(Duration::ZERO, BotAgent::think_delay)
    }

    /// Redeem a ticket once its delay has elapsed.
    ///
    /// The ticket is consumed either way. The decision is discarded when the
    /// ticket was cancelled or superseded, the game moved on, finished, or
    /// the bot is no longer eligible.
    ///
    /// # Returns
    ///
    /// * `Option<BotDecision>` - The bot's action, if it still has one to make
    pub fn decide(&mut self, ticket: &DecisionTicket, engine: &GameEngine) -> Option<BotDecision> {
        if self.outstanding.as_ref() != Some(ticket) {
            debug!("Ignoring stale ticket for {}", ticket.bot_id);
            return None;
        }
        self.outstanding = None;

        let state = engine.state();
        let still_current = state.game_id == ticket.game_id
            && state.action_seq == ticket.action_seq
            && state.stage == GameStage::Playing
            && state.player(&ticket.bot_id).is_some_and(|p| p.is_eligible());
        if !still_current {
            debug!(
                "Discarding decision for {}: game moved on since action {}",
                ticket.bot_id, ticket.action_seq
            );
            return None;
        }

        let view = engine.view_for(Some(&ticket.bot_id));
        self.bot_mut(&ticket.bot_id)?.decide(&view)
    }

    /// Drop the outstanding ticket, if any, so it can never be redeemed.
    pub fn cancel_outstanding(&mut self) -> Option<DecisionTicket> {
        self.outstanding.take()
    }

    /// Clear every bot's memory and damping, ready for a new game.
    pub fn reset_all(&mut self) {
        self.outstanding = None;
        self.consulted_seq = None;
        for bot in &mut self.bots {
            bot.reset();
        }
    }

    /// Each bot's parting line for the finished game.
    pub fn announce_game_over(&mut self, winner: &PlayerId) -> Vec<(PlayerId, &'static str)> {
        self.outstanding = None;
        self.bots
            .iter_mut()
            .filter_map(|bot| {
                let line = bot.record_game_over(winner)?;
                Some((bot.id().clone(), line))
            })
            .collect()
    }
}
