//! Table actor message types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::game::{
    entities::{Action, GameView, PlayerId, PublicAction},
    errors::{ActionError, SetupError},
};

/// Identifies one event subscription.
pub type SubscriberId = Uuid;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Deal and start the first game
    Start {
        response: oneshot::Sender<TableResponse>,
    },

    /// Player action (place, challenge, pass)
    SubmitAction {
        player: PlayerId,
        action: Action,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get the game as seen by `player`, or by a spectator when `None`
    GetView {
        player: Option<PlayerId>,
        response: oneshot::Sender<GameView>,
    },

    /// Update a player's presence flags
    SetPlayerActivity {
        player: PlayerId,
        is_active: bool,
        is_blacklisted: bool,
        is_disconnected: bool,
        response: oneshot::Sender<TableResponse>,
    },

    /// Subscribe to table events
    Subscribe {
        sender: mpsc::Sender<TableEvent>,
        response: oneshot::Sender<SubscriberId>,
    },

    /// Unsubscribe from table events
    Unsubscribe { id: SubscriberId },

    /// Abandon the current game and deal a new one to the same seats
    NewGame {
        response: oneshot::Sender<TableResponse>,
    },

    /// Close table
    Close {
        response: oneshot::Sender<TableResponse>,
    },
}

/// Event pushed to subscribers. Views are spectator views: no hand is ever
/// included.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TableEvent {
    /// Any change to the game
    StateChanged { view: GameView },

    /// A bot's action was applied
    BotAction {
        bot: PlayerId,
        action: PublicAction,
        flavor: Option<&'static str>,
        at: DateTime<Utc>,
    },

    /// The game finished
    GameOver {
        winner: PlayerId,
        lines: Vec<(PlayerId, &'static str)>,
    },
}

/// Response from table operations
#[derive(Debug, Clone, PartialEq)]
pub enum TableResponse {
    /// Operation succeeded
    Success,

    /// The action was applied
    Applied(PublicAction),

    /// The engine refused the action; nothing changed
    Rejected(ActionError),

    /// The game could not be dealt
    SetupFailed(SetupError),

    /// Operation failed
    Error(String),
}

impl TableResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(self, TableResponse::Success | TableResponse::Applied(_))
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            TableResponse::Rejected(e) => Some(format!("Invalid action: {e}")),
            TableResponse::SetupFailed(e) => Some(format!("Cannot start game: {e}")),
            TableResponse::Error(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_helpers() {
        assert!(TableResponse::Success.is_success());
        assert!(TableResponse::Success.error_message().is_none());

        let rejected = TableResponse::Rejected(ActionError::InvalidTurn);
        assert!(!rejected.is_success());
        assert!(rejected.error_message().unwrap().starts_with("Invalid action"));

        let failed = TableResponse::SetupFailed(SetupError::AlreadyStarted);
        assert!(failed.error_message().is_some());
    }
}
