//! A playable table: one game, its bots and their timers behind an async
//! actor.
//!
//! This module implements:
//! - TableActor: owns the [`GameEngine`](crate::game::GameEngine) and the
//!   [`BotOrchestrator`](crate::bot::BotOrchestrator) and is the only task
//!   that touches them
//! - TableHandle: cloneable sender side used by humans and front ends
//! - TimerQueue: bot thinking time and challenge windows as cancellable
//!   deadlines
//! - GameObserver: narration collaborator called on every event
//!
//! ## Architecture
//!
//! Each table runs in its own Tokio task with an mpsc message inbox. The
//! loop selects between the inbox and the earliest timer deadline, so all
//! mutations are serialized. Every applied action is mirrored to the bots,
//! broadcast to subscribers, and may schedule the next bot decision.
//!
//! ## Example
//!
//! ```no_run
//! use accessible_bluff::game::entities::PlayerId;
//! use accessible_bluff::table::{LogObserver, TableActor, TableConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let humans = [(PlayerId::new("ana"), "Ana".to_string())];
//!     let (actor, handle) =
//!         TableActor::new(TableConfig::default(), &humans, Box::new(LogObserver::default()))
//!             .unwrap();
//!     tokio::spawn(actor.run());
//!
//!     handle.start().await.unwrap();
//!     let view = handle.view(Some(PlayerId::new("ana"))).await.unwrap();
//!     println!("{} cards in hand", view.hand.len());
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;
pub mod narrator;
pub mod setup;
pub mod timers;

pub use actor::{TableActor, TableError, TableHandle};
pub use config::{TableConfig, TableSpeed};
pub use messages::{SubscriberId, TableEvent, TableMessage, TableResponse};
pub use narrator::{GameObserver, LogObserver, NullObserver, describe_action};
pub use setup::{GameSetup, create_game, seat_players};
pub use timers::{TimerKind, TimerQueue, TimerToken};
