//! Bluff game state machine.
//!
//! The engine owns the single authoritative [`GameState`]. Every action,
//! human or bot, goes through [`GameEngine::submit_action`], which validates
//! it completely before mutating anything, so a rejected action leaves the
//! state untouched.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::{
    constants::{DEFAULT_JOKERS, MAX_JOKERS, MAX_PLAYERS, MIN_PLAYERS},
    deck::Deck,
    entities::{
        Action, Card, ChallengeOutcome, GameStage, GameState, GameView, Player, PlayerId,
        Resolution, ResolvedAction, Value, is_declarable, value_label,
    },
    errors::{ActionError, ActionResult, SetupError, SetupResult},
};

/// Game configuration settings
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameSettings {
    pub jokers: u8,
    pub max_players: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(DEFAULT_JOKERS, MAX_PLAYERS)
    }
}

impl GameSettings {
    #[must_use]
    pub const fn new(jokers: u8, max_players: usize) -> Self {
        Self {
            jokers,
            max_players,
        }
    }
}

/// Where every card of the deck currently is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CardAccounting {
    pub in_hands: usize,
    pub pile: usize,
    pub retired: usize,
    pub undealt: usize,
    pub deck_size: usize,
}

impl CardAccounting {
    pub fn total(&self) -> usize {
        self.in_hands + self.pile + self.retired + self.undealt
    }

    pub fn is_conserved(&self) -> bool {
        self.total() == self.deck_size
    }
}

#[derive(Debug)]
pub struct GameEngine {
    settings: GameSettings,
    state: GameState,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}

impl GameEngine {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            state: GameState::new(Uuid::new_v4()),
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Full, unredacted state. Anything shown to participants must go
    /// through [`GameEngine::view_for`].
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stage(&self) -> GameStage {
        self.state.stage
    }

    pub fn is_finished(&self) -> bool {
        self.state.stage == GameStage::Finished
    }

    pub fn view_for(&self, perspective: Option<&PlayerId>) -> GameView {
        self.state.view_for(perspective)
    }

    pub fn accounting(&self) -> CardAccounting {
        CardAccounting {
            in_hands: self.state.players.iter().map(Player::card_count).sum(),
            pile: self.state.pile.len(),
            retired: self.state.retired.len(),
            undealt: self.state.undealt.len(),
            deck_size: self.state.deck_size,
        }
    }

    /// Seat a player. Only possible before the cards are dealt.
    pub fn add_player(&mut self, id: PlayerId, name: &str, is_bot: bool) -> SetupResult<()> {
        if self.state.stage != GameStage::Waiting {
            return Err(SetupError::AlreadyStarted);
        }
        if self.state.players.len() >= self.settings.max_players {
            return Err(SetupError::TooManyPlayers {
                max: self.settings.max_players,
            });
        }
        if self.state.player(&id).is_some() {
            return Err(SetupError::DuplicatePlayer(id));
        }
        self.state.players.push(Player::new(id, name, is_bot));
        self.state.version += 1;
        Ok(())
    }

    /// Shuffle a fresh deck with `rng` and deal it.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SetupResult<()> {
        if self.settings.jokers > MAX_JOKERS {
            return Err(SetupError::TooManyJokers { max: MAX_JOKERS });
        }
        let mut deck = Deck::new(self.settings.jokers);
        deck.shuffle(rng);
        self.start_with_deck(deck)
    }

    /// Deal `deck` as is and begin play with the first seated player.
    pub fn start_with_deck(&mut self, deck: Deck) -> SetupResult<()> {
        if self.state.stage != GameStage::Waiting {
            return Err(SetupError::AlreadyStarted);
        }
        let n = self.state.players.len();
        if n < MIN_PLAYERS {
            return Err(SetupError::NotEnoughPlayers { min: MIN_PLAYERS });
        }
        if deck.len() < n {
            return Err(SetupError::NotEnoughCards {
                deck: deck.len(),
                players: n,
            });
        }

        self.state.deck_size = deck.len();
        let deal = deck.deal(n);
        self.state.initial_hand_size = deal.hand_size();
        for (player, hand) in self.state.players.iter_mut().zip(deal.hands) {
            player.hand = hand;
        }
        self.state.undealt = deal.undealt;
        self.state.stage = GameStage::Playing;
        self.state.current = 0;
        if !self.state.players[0].is_eligible() {
            self.advance_turn();
        }
        self.state.version += 1;

        info!(
            "Game {} started: {} players, {} cards each, {} undealt",
            self.state.game_id,
            n,
            self.state.initial_hand_size,
            self.state.undealt.len()
        );
        Ok(())
    }

    /// Throw away the current game and deal a new one to the same seats.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SetupResult<()> {
        let mut state = GameState::new(Uuid::new_v4());
        state.players = self
            .state
            .players
            .drain(..)
            .map(|mut p| {
                p.hand.clear();
                p
            })
            .collect();
        state.version = self.state.version + 1;
        self.state = state;
        self.start(rng)
    }

    /// Validate and apply `action` for `player`.
    ///
    /// # Arguments
    ///
    /// * `player` - Acting player
    /// * `action` - Place, Challenge or Pass
    ///
    /// # Returns
    ///
    /// * `ActionResult<ResolvedAction>` - The applied action, or why it was
    ///   rejected. Rejections never change state.
    pub fn submit_action(
        &mut self,
        player: &PlayerId,
        action: Action,
    ) -> ActionResult<ResolvedAction> {
        let idx = self
            .state
            .player_index(player)
            .ok_or_else(|| ActionError::UnknownPlayer(player.clone()))?;
        if self.state.stage != GameStage::Playing {
            return Err(ActionError::GameNotInProgress);
        }
        if !self.state.players[idx].is_eligible() {
            return Err(ActionError::PlayerNotEligible(player.clone()));
        }

        let resolution = match action {
            Action::Place { cards, declared } => self.place(idx, cards, declared)?,
            Action::Challenge => self.challenge(idx)?,
            Action::Pass => self.pass(idx)?,
        };

        self.state.action_seq += 1;
        self.state.version += 1;
        let record = ResolvedAction {
            seq: self.state.action_seq,
            player: player.clone(),
            resolution,
        };
        self.state.last_action = Some(record.clone());

        if matches!(record.resolution, Resolution::Pass)
            && self.state.consecutive_passes >= self.state.eligible_count()
        {
            self.clear_round();
        }

        self.check_for_winner();
        Ok(record)
    }

    /// Close the challenge window opened by placement `seq`. Returns false
    /// when that placement is no longer the open one.
    pub fn close_challenge_window(&mut self, seq: u64) -> bool {
        let is_open_placement = self.state.challenge_open
            && self
                .state
                .last_action
                .as_ref()
                .is_some_and(|last| last.seq == seq);
        if is_open_placement {
            self.state.challenge_open = false;
            self.state.version += 1;
            debug!("Challenge window for action {seq} closed");
        }
        is_open_placement
    }

    /// Update a player's presence flags. Moves the turn along when the
    /// current actor is no longer eligible.
    pub fn set_player_activity(
        &mut self,
        player: &PlayerId,
        is_active: bool,
        is_blacklisted: bool,
        is_disconnected: bool,
    ) -> ActionResult<()> {
        let idx = self
            .state
            .player_index(player)
            .ok_or_else(|| ActionError::UnknownPlayer(player.clone()))?;
        let seat = &mut self.state.players[idx];
        seat.is_active = is_active;
        seat.is_blacklisted = is_blacklisted;
        seat.is_disconnected = is_disconnected;
        self.state.version += 1;

        if self.state.stage == GameStage::Playing {
            if idx == self.state.current && !self.state.players[idx].is_eligible() {
                self.advance_turn();
            }
            let eligible = self.state.eligible_count();
            if eligible > 0
                && self.state.consecutive_passes > 0
                && self.state.consecutive_passes >= eligible
            {
                self.clear_round();
            }
        }
        Ok(())
    }

    fn ensure_turn(&self, idx: usize) -> ActionResult<()> {
        if self.state.current != idx {
            return Err(ActionError::InvalidTurn);
        }
        Ok(())
    }

    fn place(&mut self, idx: usize, cards: Vec<Card>, declared: Value) -> ActionResult<Resolution> {
        self.ensure_turn(idx)?;
        if !is_declarable(declared) {
            return Err(ActionError::InvalidDeclaration(declared));
        }
        let distinct: HashSet<_> = cards.iter().map(|c| c.id).collect();
        let player = &self.state.players[idx];
        if cards.is_empty()
            || distinct.len() != cards.len()
            || !cards.iter().all(|c| player.holds(c))
        {
            return Err(ActionError::IllegalCards);
        }

        let player = &mut self.state.players[idx];
        player.hand.retain(|c| !cards.contains(c));
        debug!(
            "{} placed {} card(s) declared {}",
            player.id,
            cards.len(),
            value_label(declared)
        );
        self.state.pile.extend(cards.iter().copied());
        self.state.consecutive_passes = 0;
        self.state.challenge_open = true;
        self.state.open_claim = Some(declared);
        self.advance_turn();

        Ok(Resolution::Place { cards, declared })
    }

    fn challenge(&mut self, idx: usize) -> ActionResult<Resolution> {
        let Some(last) = self.state.last_action.as_ref() else {
            return Err(ActionError::NoPendingClaim);
        };
        let Resolution::Place { cards, declared } = &last.resolution else {
            return Err(ActionError::NoPendingClaim);
        };
        if !self.state.challenge_open {
            return Err(ActionError::NoPendingClaim);
        }
        let target_idx = self
            .state
            .player_index(&last.player)
            .ok_or(ActionError::NoPendingClaim)?;
        if target_idx == idx {
            return Err(ActionError::CannotChallengeSelf);
        }

        let declared = *declared;
        let revealed = cards.clone();
        let was_successful = revealed.iter().any(|c| !c.satisfies(declared));
        let receiver_idx = if was_successful { target_idx } else { idx };

        let pile = std::mem::take(&mut self.state.pile);
        let pile_size = pile.len();
        self.state.players[receiver_idx].hand.extend(pile);
        self.state.current = receiver_idx;
        if !self.state.players[receiver_idx].is_eligible() {
            self.advance_turn();
        }
        self.state.challenge_open = false;
        self.state.open_claim = None;
        self.state.consecutive_passes = 0;

        let outcome = ChallengeOutcome {
            challenger: self.state.players[idx].id.clone(),
            target: self.state.players[target_idx].id.clone(),
            declared,
            revealed,
            was_successful,
            receiver: self.state.players[receiver_idx].id.clone(),
            pile_size,
        };
        info!(
            "{} challenged {} ({}): {} picks up {} card(s)",
            outcome.challenger,
            outcome.target,
            if was_successful { "bluff" } else { "truth" },
            outcome.receiver,
            pile_size
        );
        Ok(Resolution::Challenge { outcome })
    }

    fn pass(&mut self, idx: usize) -> ActionResult<Resolution> {
        self.ensure_turn(idx)?;
        self.state.consecutive_passes += 1;
        self.state.challenge_open = false;
        self.advance_turn();
        Ok(Resolution::Pass)
    }

    /// Every eligible player passed in a row: the pile leaves play and a new
    /// round starts with no claim on the table.
    fn clear_round(&mut self) {
        let pile = std::mem::take(&mut self.state.pile);
        debug!("Round cleared, {} card(s) retired", pile.len());
        self.state.retired.extend(pile);
        self.state.last_action = None;
        self.state.open_claim = None;
        self.state.challenge_open = false;
        self.state.consecutive_passes = 0;
    }

    /// Move to the next eligible player in turn order. The turn stays put
    /// when nobody else is eligible.
    fn advance_turn(&mut self) {
        let n = self.state.players.len();
        for step in 1..=n {
            let i = (self.state.current + step) % n;
            if self.state.players[i].is_eligible() {
                self.state.current = i;
                return;
            }
        }
    }

    fn check_for_winner(&mut self) {
        if self.state.stage != GameStage::Playing {
            return;
        }
        if let Some(winner) = self.state.players.iter().find(|p| p.hand.is_empty()) {
            info!("Game {}: {} wins", self.state.game_id, winner.id);
            self.state.winner = Some(winner.id.clone());
            self.state.stage = GameStage::Finished;
            self.state.challenge_open = false;
        }
    }
}
