use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    fmt::{self},
    ops::RangeInclusive,
};
use uuid::Uuid;

use super::constants::RANKED_CARDS;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
    // Jokers carry the wild suit.
    Wild,
}

impl Suit {
    pub const RANKED: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Wild => "w",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Ace is 1, King is 13 and a joker is 0.
pub type Value = u8;

pub const JOKER: Value = 0;
pub const ACE: Value = 1;
pub const KING: Value = 13;

/// Every value a player may declare.
pub fn ranks() -> RangeInclusive<Value> {
    ACE..=KING
}

/// Whether `value` can be declared on a placement.
pub fn is_declarable(value: Value) -> bool {
    ranks().contains(&value)
}

/// Short label used when announcing a declared value ("A", "7", "K").
pub fn value_label(value: Value) -> String {
    match value {
        JOKER => "JK".to_string(),
        1 => "A".to_string(),
        11 => "J".to_string(),
        12 => "Q".to_string(),
        13 => "K".to_string(),
        v => v.to_string(),
    }
}

/// Position of a card inside the deck it was built from.
pub type CardId = u16;

/// A card is identified by its deck position so that two jokers are still
/// distinguishable once dealt.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub id: CardId,
    pub value: Value,
    pub suit: Suit,
}

impl Card {
    pub const fn new(id: CardId, value: Value, suit: Suit) -> Self {
        Self { id, value, suit }
    }

    pub const fn joker(id: CardId) -> Self {
        Self {
            id,
            value: JOKER,
            suit: Suit::Wild,
        }
    }

    pub fn is_joker(&self) -> bool {
        self.suit == Suit::Wild
    }

    /// Whether this card backs up a declaration of `declared`. Jokers back up
    /// any declaration.
    pub fn satisfies(&self, declared: Value) -> bool {
        self.is_joker() || self.value == declared
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_joker() {
            return write!(f, "  JK");
        }
        let repr = format!("{}/{}", value_label(self.value), self.suit);
        write!(f, "{repr:>4}")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Identifier for the `n`th bot seated at a table ("bot-1", "bot-2", ...).
    pub fn bot(n: usize) -> Self {
        Self(format!("bot-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A seated participant. The hand is authoritative and never leaves the
/// engine except through the owner's own [`GameView`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub is_active: bool,
    pub is_blacklisted: bool,
    pub is_disconnected: bool,
    pub hand: Vec<Card>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, is_bot: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_bot,
            is_active: true,
            is_blacklisted: false,
            is_disconnected: false,
            hand: Vec::new(),
        }
    }

    pub fn card_count(&self) -> usize {
        self.hand.len()
    }

    /// Eligible players take turns and count toward a full round of passes.
    pub fn is_eligible(&self) -> bool {
        self.is_active && !self.is_blacklisted
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.hand.contains(card)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Place,
    Challenge,
    Pass,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Place => "place",
            Self::Challenge => "challenge",
            Self::Pass => "pass",
        };
        write!(f, "{repr}")
    }
}

/// Actions a player submits to the engine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    /// Place cards face down, claiming they are all `declared`.
    Place { cards: Vec<Card>, declared: Value },
    /// Contest the most recent placement.
    Challenge,
    Pass,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Place { .. } => ActionKind::Place,
            Self::Challenge => ActionKind::Challenge,
            Self::Pass => ActionKind::Pass,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place { cards, declared } => write!(
                f,
                "places {} card(s) as {}",
                cards.len(),
                value_label(*declared)
            ),
            Self::Challenge => write!(f, "challenges"),
            Self::Pass => write!(f, "passes"),
        }
    }
}

/// Result of resolving a challenge. Revealed cards are public from this
/// point on.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChallengeOutcome {
    pub challenger: PlayerId,
    /// Author of the contested placement.
    pub target: PlayerId,
    pub declared: Value,
    pub revealed: Vec<Card>,
    /// True when the placement was a lie.
    pub was_successful: bool,
    /// Player who picked up the pile.
    pub receiver: PlayerId,
    pub pile_size: usize,
}

/// An applied action as the engine records it, including hidden card faces.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolution {
    Place { cards: Vec<Card>, declared: Value },
    Challenge { outcome: ChallengeOutcome },
    Pass,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedAction {
    /// Position of this action in the game's action sequence (1-based).
    pub seq: u64,
    pub player: PlayerId,
    pub resolution: Resolution,
}

impl ResolvedAction {
    pub fn action_kind(&self) -> ActionKind {
        match self.resolution {
            Resolution::Place { .. } => ActionKind::Place,
            Resolution::Challenge { .. } => ActionKind::Challenge,
            Resolution::Pass => ActionKind::Pass,
        }
    }

    pub fn challenge_outcome(&self) -> Option<&ChallengeOutcome> {
        match &self.resolution {
            Resolution::Challenge { outcome } => Some(outcome),
            _ => None,
        }
    }

    /// Redacted form safe to show every participant.
    pub fn to_public(&self) -> PublicAction {
        let kind = match &self.resolution {
            Resolution::Place { cards, declared } => PublicActionKind::Place {
                card_count: cards.len(),
                declared: *declared,
            },
            Resolution::Challenge { outcome } => PublicActionKind::Challenge {
                outcome: outcome.clone(),
            },
            Resolution::Pass => PublicActionKind::Pass,
        };
        PublicAction {
            seq: self.seq,
            player: self.player.clone(),
            kind,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PublicActionKind {
    Place { card_count: usize, declared: Value },
    Challenge { outcome: ChallengeOutcome },
    Pass,
}

/// An applied action with placed card faces hidden.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PublicAction {
    pub seq: u64,
    pub player: PlayerId,
    pub kind: PublicActionKind,
}

impl PublicAction {
    pub fn action_kind(&self) -> ActionKind {
        match self.kind {
            PublicActionKind::Place { .. } => ActionKind::Place,
            PublicActionKind::Challenge { .. } => ActionKind::Challenge,
            PublicActionKind::Pass => ActionKind::Pass,
        }
    }

    /// Card count and declared value when this is a placement.
    pub fn placement(&self) -> Option<(usize, Value)> {
        match self.kind {
            PublicActionKind::Place {
                card_count,
                declared,
            } => Some((card_count, declared)),
            _ => None,
        }
    }

    pub fn challenge_outcome(&self) -> Option<&ChallengeOutcome> {
        match &self.kind {
            PublicActionKind::Challenge { outcome } => Some(outcome),
            _ => None,
        }
    }
}

impl fmt::Display for PublicAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PublicActionKind::Place {
                card_count,
                declared,
            } => write!(
                f,
                "{} places {card_count} card(s) as {}",
                self.player,
                value_label(*declared)
            ),
            PublicActionKind::Challenge { outcome } => {
                let verdict = if outcome.was_successful {
                    "caught a bluff"
                } else {
                    "was wrong"
                };
                write!(
                    f,
                    "{} challenges {} and {verdict}; {} takes {} card(s)",
                    self.player, outcome.target, outcome.receiver, outcome.pile_size
                )
            }
            PublicActionKind::Pass => write!(f, "{} passes", self.player),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStage {
    Waiting,
    Playing,
    Finished,
}

impl fmt::Display for GameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// The authoritative game state. Only the engine mutates it and only the
/// engine's owner reads it directly; everyone else gets a [`GameView`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameState {
    pub game_id: Uuid,
    /// Turn order is list order.
    pub players: Vec<Player>,
    /// Index of the current actor in `players`.
    pub current: usize,
    pub pile: Vec<Card>,
    pub last_action: Option<ResolvedAction>,
    pub stage: GameStage,
    pub winner: Option<PlayerId>,
    /// Piles cleared by a full round of passes. Out of play.
    pub retired: Vec<Card>,
    /// Remainder that did not divide evenly at the deal. Never in play.
    pub undealt: Vec<Card>,
    pub deck_size: usize,
    pub initial_hand_size: usize,
    pub consecutive_passes: usize,
    pub challenge_open: bool,
    /// Declared value of the most recent placement on the current pile.
    pub open_claim: Option<Value>,
    /// Number of applied actions.
    pub action_seq: u64,
    /// Bumped on every mutation.
    pub version: u64,
}

impl GameState {
    pub fn new(game_id: Uuid) -> Self {
        Self {
            game_id,
            players: Vec::new(),
            current: 0,
            pile: Vec::new(),
            last_action: None,
            stage: GameStage::Waiting,
            winner: None,
            retired: Vec::new(),
            undealt: Vec::new(),
            deck_size: 0,
            initial_hand_size: 0,
            consecutive_passes: 0,
            challenge_open: false,
            open_claim: None,
            action_seq: 0,
            version: 0,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        match self.stage {
            GameStage::Playing => self.players.get(self.current),
            _ => None,
        }
    }

    pub fn eligible_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_eligible()).count()
    }

    /// Project the state for `perspective`. Only that player's hand is
    /// included; everyone else is reduced to a card count.
    pub fn view_for(&self, perspective: Option<&PlayerId>) -> GameView {
        let hand = perspective
            .and_then(|id| self.player(id))
            .map(|p| p.hand.clone())
            .unwrap_or_default();
        GameView {
            game_id: self.game_id,
            stage: self.stage,
            players: self.players.iter().map(PlayerView::from).collect(),
            current_player: self.current_player().map(|p| p.id.clone()),
            pile_size: self.pile.len(),
            last_action: self.last_action.as_ref().map(ResolvedAction::to_public),
            open_claim: self.open_claim,
            challenge_open: self.challenge_open,
            winner: self.winner.clone(),
            perspective: perspective.cloned(),
            hand,
            deck_size: self.deck_size,
            initial_hand_size: self.initial_hand_size,
            action_seq: self.action_seq,
            version: self.version,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub is_active: bool,
    pub is_blacklisted: bool,
    pub is_disconnected: bool,
    pub card_count: usize,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            is_bot: player.is_bot,
            is_active: player.is_active,
            is_blacklisted: player.is_blacklisted,
            is_disconnected: player.is_disconnected,
            card_count: player.card_count(),
        }
    }
}

/// What a single participant (or a spectator) is allowed to see.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameView {
    pub game_id: Uuid,
    pub stage: GameStage,
    pub players: Vec<PlayerView>,
    pub current_player: Option<PlayerId>,
    pub pile_size: usize,
    pub last_action: Option<PublicAction>,
    pub open_claim: Option<Value>,
    pub challenge_open: bool,
    pub winner: Option<PlayerId>,
    /// Whose hand is included below. `None` for spectators.
    pub perspective: Option<PlayerId>,
    pub hand: Vec<Card>,
    pub deck_size: usize,
    pub initial_hand_size: usize,
    pub action_seq: u64,
    pub version: u64,
}

impl GameView {
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn card_count_of(&self, id: &PlayerId) -> usize {
        self.player(id).map_or(0, |p| p.card_count)
    }

    pub fn is_turn_of(&self, id: &PlayerId) -> bool {
        self.current_player.as_ref() == Some(id)
    }

    pub fn average_hand_size(&self) -> f32 {
        if self.players.is_empty() {
            return 0.0;
        }
        let total: usize = self.players.iter().map(|p| p.card_count).sum();
        total as f32 / self.players.len() as f32
    }

    /// The placement a challenge would currently contest.
    pub fn pending_claim(&self) -> Option<(&PlayerId, usize, Value)> {
        if !self.challenge_open {
            return None;
        }
        let last = self.last_action.as_ref()?;
        let (count, declared) = last.placement()?;
        Some((&last.player, count, declared))
    }

    /// Jokers the deck could contain, judging by its size.
    pub fn possible_jokers(&self) -> usize {
        self.deck_size.saturating_sub(RANKED_CARDS)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
