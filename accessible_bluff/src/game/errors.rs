//! Game error types.

use thiserror::Error;

use super::entities::PlayerId;

/// Reasons the engine rejects a submitted action. A rejected action never
/// changes the game state.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ActionError {
    /// The action needs turn ownership and it is someone else's turn
    #[error("not your turn")]
    InvalidTurn,

    /// Placement is empty, repeats a card or uses cards not in hand
    #[error("illegal card selection")]
    IllegalCards,

    /// Nothing to challenge: the last action is not an open placement
    #[error("no pending claim to challenge")]
    NoPendingClaim,

    /// Player id is not seated in this game
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Declared value is not a rank
    #[error("can't declare {0}")]
    InvalidDeclaration(u8),

    /// Placer tried to challenge their own placement
    #[error("can't challenge your own placement")]
    CannotChallengeSelf,

    /// Player is inactive or blacklisted
    #[error("player {0} can't act right now")]
    PlayerNotEligible(PlayerId),

    /// Game hasn't started or is already over
    #[error("game is not in progress")]
    GameNotInProgress,
}

/// Reasons a game can't be set up or started.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SetupError {
    #[error("need {min}+ players")]
    NotEnoughPlayers { min: usize },

    #[error("game is full ({max} players)")]
    TooManyPlayers { max: usize },

    #[error("player {0} already exists")]
    DuplicatePlayer(PlayerId),

    #[error("game already started")]
    AlreadyStarted,

    #[error("deck of {deck} cards can't deal {players} players")]
    NotEnoughCards { deck: usize, players: usize },

    #[error("at most {max} jokers")]
    TooManyJokers { max: u8 },
}

pub type ActionResult<T> = Result<T, ActionError>;
pub type SetupResult<T> = Result<T, SetupError>;
