//! # Accessible Bluff
//!
//! A "Bluff"/"Cheat" card game engine with computer opponents.
//!
//! Players take turns putting cards face down on a pile while declaring
//! what they are. The declaration may be a lie. Any other player may
//! challenge the most recent placement while its challenge window is open:
//! if any placed card fails to match the declaration (jokers match
//! anything) the placer picks up the whole pile, otherwise the challenger
//! does. A full round of passes clears the pile. The first player with an
//! empty hand wins.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, deck, the authoritative state machine and redacted views
//! - [`bot`]: Personalities, per-opponent memory, three strategy tiers and
//!   the orchestrator that paces bot decisions
//! - [`table`]: Async actor running one game with timers, subscribers and a
//!   narration collaborator
//!
//! ## Example
//!
//! ```
//! use accessible_bluff::game::{GameEngine, entities::{Action, PlayerId}};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut engine = GameEngine::default();
//! engine.add_player(PlayerId::new("ana"), "Ana", false).unwrap();
//! engine.add_player(PlayerId::new("ben"), "Ben", false).unwrap();
//! engine.start(&mut StdRng::seed_from_u64(7)).unwrap();
//!
//! let ana = PlayerId::new("ana");
//! let card = engine.view_for(Some(&ana)).hand[0];
//! engine
//!     .submit_action(&ana, Action::Place { cards: vec![card], declared: 7 })
//!     .unwrap();
//! assert!(engine.accounting().is_conserved());
//! ```

/// Computer opponents.
pub mod bot;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ActionError, GameEngine, GameSettings, SetupError,
    constants::{self, MAX_PLAYERS, MIN_PLAYERS},
    entities::{self, Action, Card, GameView, PlayerId},
};

/// Table actor, timers and narration.
pub mod table;
pub use table::{TableActor, TableConfig, TableHandle};

#[cfg(test)]
pub(crate) mod testing;
