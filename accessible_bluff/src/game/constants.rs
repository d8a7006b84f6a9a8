//! Fixed table and deck sizes.

/// Ranks per suit (Ace through King).
pub const RANKS_PER_SUIT: usize = 13;

/// Number of ranked suits in a deck.
pub const SUITS: usize = 4;

/// Copies of each rank in a full deck, ignoring jokers.
pub const CARDS_PER_RANK: u8 = SUITS as u8;

/// Ranked cards in a full deck.
pub const RANKED_CARDS: usize = RANKS_PER_SUIT * SUITS;

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;

/// Most players a single game seats.
pub const MAX_PLAYERS: usize = 10;

/// Most jokers a deck may be configured with.
pub const MAX_JOKERS: u8 = 4;

/// Default joker count for new tables.
pub const DEFAULT_JOKERS: u8 = 2;
