//! Computer opponents.
//!
//! A bot is a [`BotAgent`] built from three parts:
//! - a [`Personality`]: fixed biases (bluff and challenge modifiers, risk
//!   tolerance, noise) and a bank of flavor lines;
//! - a [`MemorySystem`]: what the bot has learned about every other
//!   player's honesty and which cards have been revealed;
//! - a [`Strategy`] picked by difficulty: Beginner, Intermediate or Advanced.
//!
//! The [`BotOrchestrator`] owns all bots at a table. It mirrors every applied
//! action into their memories and hands out at most one
//! [`DecisionTicket`] at a time; a ticket is only redeemed if the game has
//! not moved on in the meantime.
//!
//! ## Difficulty tiers
//!
//! ### Beginner
//! - Challenges at a flat 20%, adjusted by personality
//! - Plays its lowest value, bluffs 20% of the time with a random value
//!
//! ### Intermediate
//! - Challenges more when the placer has been caught bluffing or when it
//!   holds copies of the claimed value itself
//! - Plays the value the table has declared most, bluffs close to the truth
//!
//! ### Advanced
//! - Weighs trust, claim plausibility, game stage and who is about to win
//! - Always challenges a claim its own hand proves impossible
//! - Chooses bluff values opponents are unlikely to be able to disprove
//!
//! ## Example
//!
//! ```
//! use accessible_bluff::bot::{BotDifficulty, BotOrchestrator};
//! use accessible_bluff::game::GameEngine;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut engine = GameEngine::default();
//! let mut bots = BotOrchestrator::new();
//! for config in bots.create_bots(BotDifficulty::Advanced, 3, Some(42)) {
//!     engine.add_player(config.id, &config.name, true).unwrap();
//! }
//! engine.start(&mut StdRng::seed_from_u64(42)).unwrap();
//!
//! let ticket = bots.request_decision(&engine).unwrap();
//! let decision = bots.decide(&ticket, &engine).unwrap();
//! let record = engine.submit_action(&ticket.bot_id, decision.action).unwrap();
//! bots.mirror_state(&engine, &record);
//! ```

pub mod agent;
pub mod memory;
pub mod models;
pub mod orchestrator;
pub mod personality;
pub mod strategy;

pub use agent::{BotAgent, BotDecision, RepetitionDamping};
pub use memory::{MemorySystem, PlayerProfile};
pub use models::{BotConfig, BotDifficulty, BotStats, DifficultyParams};
pub use orchestrator::{BotMove, BotOrchestrator, DecisionTicket, apply_bot_action};
pub use personality::{Personality, PersonalityKind};
pub use strategy::{Strategy, StrategyPolicy};
