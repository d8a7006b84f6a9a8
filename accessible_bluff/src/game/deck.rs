//! Deck construction, shuffling and dealing.

use rand::{Rng, seq::SliceRandom};

use super::{
    constants::{RANKS_PER_SUIT, RANKED_CARDS},
    entities::{ACE, Card, CardId, Suit},
};

/// An ordered set of cards: four ranked suits plus any configured jokers.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    jokers: u8,
}

/// Hands produced by [`Deck::deal`]. `undealt` holds the remainder that did
/// not divide evenly among players; it never enters play.
#[derive(Clone, Debug, Default)]
pub struct Deal {
    pub hands: Vec<Vec<Card>>,
    pub undealt: Vec<Card>,
}

impl Deal {
    pub fn hand_size(&self) -> usize {
        self.hands.first().map_or(0, Vec::len)
    }
}

impl Deck {
    pub fn new(jokers: u8) -> Self {
        let mut cards = Vec::with_capacity(RANKED_CARDS + jokers as usize);
        for (i, value) in (ACE..ACE + RANKS_PER_SUIT as u8).enumerate() {
            for (j, suit) in Suit::RANKED.into_iter().enumerate() {
                cards.push(Card::new((4 * i + j) as CardId, value, suit));
            }
        }
        for k in 0..jokers {
            cards.push(Card::joker((RANKED_CARDS + k as usize) as CardId));
        }
        Self { cards, jokers }
    }

    /// A deck in exactly the given order. Jokers are counted from the cards.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let jokers = cards.iter().filter(|c| c.is_joker()).count() as u8;
        Self { cards, jokers }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn jokers(&self) -> u8 {
        self.jokers
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Fisher-Yates shuffle driven by `rng`, so a seeded source reproduces
    /// the same order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Deal contiguous, equally sized slices to `players` players.
    pub fn deal(self, players: usize) -> Deal {
        let per_player = self.cards.len().checked_div(players).unwrap_or(0);
        let mut cards = self.cards;
        let undealt = cards.split_off(per_player * players);
        let hands = (0..players)
            .map(|i| cards[i * per_player..(i + 1) * per_player].to_vec())
            .collect();
        Deal { hands, undealt }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(0)
    }
}
