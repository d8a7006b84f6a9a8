//! Fixtures shared by the unit tests.

use crate::game::{
    Deck, GameEngine,
    entities::{Card, PlayerId, Suit, Value},
};

pub fn pid(i: usize) -> PlayerId {
    PlayerId::new(&format!("p{i}"))
}

/// Ranked card with a suit derived from its id.
pub fn card(id: u16, value: Value) -> Card {
    Card::new(id, value, Suit::RANKED[id as usize % 4])
}

pub fn suited(id: u16, value: Value, suit: Suit) -> Card {
    Card::new(id, value, suit)
}

/// Cards with the given values and consecutive ids starting at `first_id`.
pub fn cards(first_id: u16, values: &[Value]) -> Vec<Card> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| card(first_id + i as u16, *v))
        .collect()
}

/// A started game where seat `i` (id `p{i}`) holds `hands[i]`. Hands must
/// all be the same size.
pub fn engine_with_hands(hands: &[Vec<Card>]) -> GameEngine {
    let mut engine = GameEngine::default();
    for i in 0..hands.len() {
        engine
            .add_player(pid(i), &format!("P{i}"), i > 0)
            .unwrap();
    }
    engine
        .start_with_deck(Deck::from_cards(hands.concat()))
        .unwrap();
    engine
}
