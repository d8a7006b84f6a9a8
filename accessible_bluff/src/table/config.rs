//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    bot::BotDifficulty,
    game::{
        GameSettings,
        constants::{DEFAULT_JOKERS, MAX_JOKERS, MAX_PLAYERS, MIN_PLAYERS},
    },
};

/// Longest challenge window a table accepts.
pub const MAX_CHALLENGE_WINDOW_MS: u64 = 60_000;

/// Table speed variants. Scales how long bots think.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSpeed {
    Normal,
    Turbo,
    /// Bots act as soon as they are asked
    Instant,
}

impl std::fmt::Display for TableSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSpeed::Normal => write!(f, "normal"),
            TableSpeed::Turbo => write!(f, "turbo"),
            TableSpeed::Instant => write!(f, "instant"),
        }
    }
}

impl TableSpeed {
    /// Scale a bot's thinking time for this speed.
    pub fn pace(&self, think: Duration) -> Duration {
        match self {
            TableSpeed::Normal => think,
            TableSpeed::Turbo => think / 2,
            TableSpeed::Instant => Duration::ZERO,
        }
    }
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Maximum number of players, humans and bots (default: 10)
    pub max_players: usize,

    /// Jokers shuffled into the deck (default: 2)
    pub jokers: u8,

    /// Number of bots seated after the humans
    pub bot_count: usize,

    /// Difficulty shared by every bot
    pub bot_difficulty: BotDifficulty,

    /// How long a placement stays open to challenges, in milliseconds
    pub challenge_window_ms: u64,

    /// Table speed
    pub speed: TableSpeed,

    /// Seed for the deck and the bots. `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Bluff Table".to_string(),
            max_players: MAX_PLAYERS,
            jokers: DEFAULT_JOKERS,
            bot_count: 3,
            bot_difficulty: BotDifficulty::Intermediate,
            challenge_window_ms: 5_000,
            speed: TableSpeed::Normal,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_players < MIN_PLAYERS || self.max_players > MAX_PLAYERS {
            return Err(format!(
                "Max players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
            ));
        }

        if self.jokers > MAX_JOKERS {
            return Err(format!("At most {MAX_JOKERS} jokers are allowed"));
        }

        if self.bot_count > self.max_players {
            return Err("Bot count cannot exceed max players".to_string());
        }

        if self.challenge_window_ms == 0 || self.challenge_window_ms > MAX_CHALLENGE_WINDOW_MS {
            return Err(format!(
                "Challenge window must be between 1 and {MAX_CHALLENGE_WINDOW_MS} ms"
            ));
        }

        Ok(())
    }

    pub fn game_settings(&self) -> GameSettings {
        GameSettings::new(self.jokers, self.max_players)
    }

    pub fn challenge_window(&self) -> Duration {
        Duration::from_millis(self.challenge_window_ms)
    }
}
