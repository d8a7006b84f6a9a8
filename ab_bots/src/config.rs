//! Simulation configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use accessible_bluff::{
    bot::BotDifficulty,
    constants::{DEFAULT_JOKERS, MAX_JOKERS, MAX_PLAYERS, MIN_PLAYERS},
    table::{TableConfig, TableSpeed, config::MAX_CHALLENGE_WINDOW_MS},
};
use std::str::FromStr;

/// Complete simulation configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Bots seated at every table
    pub bot_count: usize,
    /// Difficulty shared by every bot
    pub difficulty: BotDifficulty,
    /// Jokers shuffled into each deck
    pub jokers: u8,
    /// Number of games to play back to back
    pub games: usize,
    /// Base seed; game `n` uses `seed + n`
    pub seed: Option<u64>,
    /// Challenge window per placement, in milliseconds
    pub challenge_window_ms: u64,
    /// Skip bot thinking delays
    pub fast: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bot_count: 4,
            difficulty: BotDifficulty::Intermediate,
            jokers: DEFAULT_JOKERS,
            games: 1,
            seed: None,
            challenge_window_ms: 5_000,
            fast: false,
        }
    }
}

impl SimConfig {
    /// Load configuration from the process environment
    ///
    /// # Returns
    ///
    /// * `Result<SimConfig, ConfigError>` - Loaded configuration or error
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// unset variables
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable, if set
    ///
    /// # Returns
    ///
    /// * `Result<SimConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let seed = match lookup("BLUFF_SEED") {
            Some(raw) => Some(parse_var("BLUFF_SEED", &raw)?),
            None => None,
        };

        Ok(SimConfig {
            bot_count: parse_or(&lookup, "BLUFF_BOT_COUNT", defaults.bot_count)?,
            difficulty: parse_or(&lookup, "BLUFF_DIFFICULTY", defaults.difficulty)?,
            jokers: parse_or(&lookup, "BLUFF_JOKERS", defaults.jokers)?,
            games: parse_or(&lookup, "BLUFF_GAMES", defaults.games)?,
            seed,
            challenge_window_ms: parse_or(
                &lookup,
                "BLUFF_CHALLENGE_WINDOW_MS",
                defaults.challenge_window_ms,
            )?,
            fast: parse_or(&lookup, "BLUFF_FAST", defaults.fast)?,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_count < MIN_PLAYERS || self.bot_count > MAX_PLAYERS {
            return Err(ConfigError::Invalid {
                var: "BLUFF_BOT_COUNT".to_string(),
                reason: format!("Must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            });
        }

        if self.jokers > MAX_JOKERS {
            return Err(ConfigError::Invalid {
                var: "BLUFF_JOKERS".to_string(),
                reason: format!("Must be at most {MAX_JOKERS}"),
            });
        }

        if self.games == 0 {
            return Err(ConfigError::Invalid {
                var: "BLUFF_GAMES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.challenge_window_ms == 0 || self.challenge_window_ms > MAX_CHALLENGE_WINDOW_MS {
            return Err(ConfigError::Invalid {
                var: "BLUFF_CHALLENGE_WINDOW_MS".to_string(),
                reason: format!("Must be between 1 and {MAX_CHALLENGE_WINDOW_MS}"),
            });
        }

        Ok(())
    }

    /// Table configuration for the `n`th game of the run
    pub fn table_config(&self, n: usize) -> TableConfig {
        TableConfig {
            name: format!("Sim {}", n + 1),
            max_players: MAX_PLAYERS,
            jokers: self.jokers,
            bot_count: self.bot_count,
            bot_difficulty: self.difficulty,
            challenge_window_ms: self.challenge_window_ms,
            speed: if self.fast {
                TableSpeed::Instant
            } else {
                TableSpeed::Normal
            },
            seed: self.seed.map(|s| s.wrapping_add(n as u64)),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("Can't parse '{raw}'"),
    })
}

/// Helper to parse a variable with default fallback when unset
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_var(key, &raw),
        None => Ok(default),
    }
}
