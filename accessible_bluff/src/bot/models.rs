//! Bot player models and configuration.

use crate::game::entities::PlayerId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Bot difficulty tiers. Each tier picks its strategy and weights the
/// personality draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    Beginner,     // Flat probabilities, no memory use
    Intermediate, // Reads bluff history and its own hand
    Advanced,     // Card tracking, trust and game-stage awareness
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotDifficulty::Beginner => write!(f, "beginner"),
            BotDifficulty::Intermediate => write!(f, "intermediate"),
            BotDifficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for BotDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Ok(BotDifficulty::Beginner),
            "intermediate" | "medium" => Ok(BotDifficulty::Intermediate),
            "advanced" | "hard" => Ok(BotDifficulty::Advanced),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Bot player configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Seat id ("bot-1", ...)
    pub id: PlayerId,

    /// Bot display name
    pub name: String,

    /// Difficulty preset
    pub difficulty: BotDifficulty,

    /// Seed for the bot's private random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl BotConfig {
    /// Config for the `n`th bot at a table: id `bot-n`, name `Bot n`.
    pub fn numbered(n: usize, difficulty: BotDifficulty, seed: Option<u64>) -> Self {
        Self {
            id: PlayerId::bot(n),
            name: format!("Bot {n}"),
            difficulty,
            seed,
        }
    }
}

/// Pacing parameters per difficulty
#[derive(Debug, Clone)]
pub struct DifficultyParams {
    /// Average thinking time in milliseconds (base)
    pub base_think_time_ms: u64,

    /// Random variance in thinking time (±milliseconds)
    pub think_time_variance_ms: u64,
}

impl DifficultyParams {
    /// Beginners answer quickly
    pub fn beginner() -> Self {
        Self {
            base_think_time_ms: 1200,
            think_time_variance_ms: 400,
        }
    }

    pub fn intermediate() -> Self {
        Self {
            base_think_time_ms: 1500,
            think_time_variance_ms: 500,
        }
    }

    /// Advanced bots take a little longer, like a player counting cards
    pub fn advanced() -> Self {
        Self {
            base_think_time_ms: 1800,
            think_time_variance_ms: 700,
        }
    }

    /// Get parameters for a given difficulty
    pub fn from_difficulty(difficulty: BotDifficulty) -> Self {
        match difficulty {
            BotDifficulty::Beginner => Self::beginner(),
            BotDifficulty::Intermediate => Self::intermediate(),
            BotDifficulty::Advanced => Self::advanced(),
        }
    }
}

/// Bot statistics tracker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotStats {
    /// Total placements made
    pub placements: u32,

    /// Placements whose declaration didn't match every card
    pub bluffs: u32,

    /// Bluffs that were challenged and exposed
    pub times_caught: u32,

    /// Challenges issued
    pub challenges_made: u32,

    /// Challenges that exposed a bluff
    pub challenges_won: u32,

    /// Turns passed
    pub passes: u32,

    /// Cards picked up from the pile
    pub cards_picked_up: u32,

    /// Games finished while seated
    pub games_played: u32,

    /// Games won
    pub games_won: u32,
}

impl BotStats {
    /// Share of placements that were bluffs
    pub fn bluff_rate(&self) -> f32 {
        if self.placements == 0 {
            0.0
        } else {
            self.bluffs as f32 / self.placements as f32
        }
    }

    /// Share of challenges that exposed a bluff
    pub fn challenge_accuracy(&self) -> f32 {
        if self.challenges_made == 0 {
            0.0
        } else {
            self.challenges_won as f32 / self.challenges_made as f32
        }
    }

    /// Share of finished games won
    pub fn win_rate(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.games_won as f32 / self.games_played as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Advanced".parse::<BotDifficulty>(), Ok(BotDifficulty::Advanced));
        assert_eq!("easy".parse::<BotDifficulty>(), Ok(BotDifficulty::Beginner));
        assert!("grandmaster".parse::<BotDifficulty>().is_err());
        assert_eq!(BotDifficulty::Intermediate.to_string(), "intermediate");
    }

    #[test]
    fn test_numbered_config() {
        let config = BotConfig::numbered(3, BotDifficulty::Beginner, None);
        assert_eq!(config.id.as_str(), "bot-3");
        assert_eq!(config.name, "Bot 3");
    }

    #[test]
    fn test_stats_rates() {
        let stats = BotStats {
            placements: 4,
            bluffs: 1,
            challenges_made: 2,
            challenges_won: 2,
            ..Default::default()
        };
        assert_eq!(stats.bluff_rate(), 0.25);
        assert_eq!(stats.challenge_accuracy(), 1.0);
        assert_eq!(stats.win_rate(), 0.0);
    }
}
