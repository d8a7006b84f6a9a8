//! Difficulty-tier decision policies.
//!
//! A strategy answers two questions for a bot: should it challenge the
//! claim currently open, and, when it is its turn to place, which cards to
//! put down and what to declare. Strategies are stateless; everything they
//! know about opponents comes from the bot's [`MemorySystem`] and all
//! randomness from the rng they are handed.

mod advanced;
mod beginner;
mod intermediate;

pub use advanced::AdvancedStrategy;
pub use beginner::BeginnerStrategy;
pub use intermediate::IntermediateStrategy;

use enum_dispatch::enum_dispatch;
use rand::{Rng, RngCore, seq::IndexedRandom};
use std::collections::BTreeMap;

use super::{memory::MemorySystem, models::BotDifficulty, personality::Personality};
use crate::game::entities::{ACE, Action, Card, GameView, KING, PlayerId, Value, ranks};

/// What a strategy gets to look at when deciding.
#[derive(Clone, Copy, Debug)]
pub struct DecisionContext<'a> {
    pub view: &'a GameView,
    pub hand: &'a [Card],
    pub me: &'a PlayerId,
    pub personality: &'static Personality,
}

impl<'a> DecisionContext<'a> {
    pub fn new(view: &'a GameView, me: &'a PlayerId, personality: &'static Personality) -> Self {
        Self {
            view,
            hand: &view.hand,
            me,
            personality,
        }
    }

    /// The open claim, unless it is our own.
    pub fn pending_claim(&self) -> Option<(&'a PlayerId, usize, Value)> {
        self.view
            .pending_claim()
            .filter(|(placer, _, _)| *placer != self.me)
    }

    /// Ranked cards of `value` in hand. Jokers are not counted.
    pub fn held(&self, value: Value) -> usize {
        self.hand
            .iter()
            .filter(|c| !c.is_joker() && c.value == value)
            .count()
    }

    pub fn jokers(&self) -> Vec<Card> {
        self.hand.iter().filter(|c| c.is_joker()).copied().collect()
    }
}

/// Cards to put down and the value to declare for them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Play {
    pub cards: Vec<Card>,
    pub declared: Value,
}

impl Play {
    /// Whether at least one card fails to back the declaration.
    pub fn is_bluff(&self) -> bool {
        self.cards.iter().any(|c| !c.satisfies(self.declared))
    }

    pub fn into_action(self) -> Action {
        Action::Place {
            cards: self.cards,
            declared: self.declared,
        }
    }
}

#[enum_dispatch]
pub trait StrategyPolicy {
    /// Whether to contest the pending claim. Always false when there is
    /// nothing to contest.
    fn decide_challenge(
        &self,
        ctx: &DecisionContext<'_>,
        memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Cards and declaration for a placement. Only called with a non-empty
    /// hand; the cards returned are always a subset of it.
    fn select_play(
        &self,
        ctx: &DecisionContext<'_>,
        memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> Play;
}

#[enum_dispatch(StrategyPolicy)]
#[derive(Clone, Debug)]
pub enum Strategy {
    Beginner(BeginnerStrategy),
    Intermediate(IntermediateStrategy),
    Advanced(AdvancedStrategy),
}

impl Strategy {
    pub fn for_difficulty(difficulty: BotDifficulty) -> Self {
        match difficulty {
            BotDifficulty::Beginner => BeginnerStrategy.into(),
            BotDifficulty::Intermediate => IntermediateStrategy.into(),
            BotDifficulty::Advanced => AdvancedStrategy.into(),
        }
    }
}

/// Bernoulli draw that tolerates probabilities pushed outside `[0, 1]` by
/// modifiers and noise.
pub(crate) fn chance(rng: &mut dyn RngCore, p: f32) -> bool {
    rng.random_bool(f64::from(p.clamp(0.0, 1.0)))
}

pub(crate) fn random_rank(rng: &mut dyn RngCore) -> Value {
    rng.random_range(ranks())
}

/// A declarable value other than `value`.
pub(crate) fn other_rank(value: Value, rng: &mut dyn RngCore) -> Value {
    let offset = rng.random_range(1..KING);
    (value - ACE + offset) % KING + ACE
}

/// Ranked cards in hand grouped by value, lowest value first.
pub(crate) fn group_by_value(hand: &[Card]) -> BTreeMap<Value, Vec<Card>> {
    let mut groups: BTreeMap<Value, Vec<Card>> = BTreeMap::new();
    for card in hand.iter().filter(|c| !c.is_joker()) {
        groups.entry(card.value).or_default().push(*card);
    }
    groups
}

/// How many cards to put down from a group of `available`: one, plus a
/// uniform draw in `[0, spread)`, nudged by the personality's multi-card
/// modifier.
pub(crate) fn cards_to_play(
    available: usize,
    spread: f32,
    multi_card_modifier: f32,
    rng: &mut dyn RngCore,
) -> usize {
    let mut n = 1 + (rng.random::<f32>() * spread.max(0.0)).floor() as usize;
    if multi_card_modifier > 0.0 && chance(rng, multi_card_modifier) {
        n += 1;
    } else if multi_card_modifier < 0.0 && n > 1 && chance(rng, -multi_card_modifier) {
        n -= 1;
    }
    n.clamp(1, available.max(1))
}

/// Add one ranked card that does not match `declared` and is not already
/// selected. Returns false when the hand has none.
pub(crate) fn slip_extra_card(
    selected: &mut Vec<Card>,
    hand: &[Card],
    declared: Value,
    rng: &mut dyn RngCore,
) -> bool {
    let candidates: Vec<&Card> = hand
        .iter()
        .filter(|c| !c.satisfies(declared) && !selected.contains(c))
        .collect();
    match candidates.choose(rng) {
        Some(card) => {
            selected.push(**card);
            true
        }
        None => false,
    }
}

/// Placement for a hand with no ranked cards: up to two jokers, declared as
/// the open claim or any value.
pub(crate) fn joker_play(ctx: &DecisionContext<'_>, rng: &mut dyn RngCore) -> Play {
    let jokers = ctx.jokers();
    let pool = if jokers.is_empty() {
        ctx.hand.to_vec()
    } else {
        jokers
    };
    let n = cards_to_play(pool.len(), 2.0, ctx.personality.multi_card_modifier, rng);
    let declared = ctx.view.open_claim.unwrap_or_else(|| random_rank(rng));
    Play {
        cards: pool.into_iter().take(n).collect(),
        declared,
    }
}
