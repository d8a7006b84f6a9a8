//! Bluff game engine - card model, deck and turn/challenge state machine.
//!
//! This module provides:
//! - Cards, players, actions and the authoritative game state
//! - Redacted per-player views for anything that leaves the engine
//! - Deck building, seeded shuffling and dealing
//! - The `GameEngine` state machine (waiting -> playing -> finished)

pub mod constants;
pub mod deck;
pub mod engine;
pub mod entities;
pub mod errors;

pub use deck::{Deal, Deck};
pub use engine::{CardAccounting, GameEngine, GameSettings};
pub use errors::{ActionError, ActionResult, SetupError, SetupResult};
