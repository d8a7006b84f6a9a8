//! Intermediate tier: reads opponents' bluff rates and the declaration
//! history from memory.

use rand::{Rng, RngCore};

use super::{
    DecisionContext, Play, StrategyPolicy, cards_to_play, chance, group_by_value, joker_play,
    slip_extra_card,
};
use crate::{
    bot::memory::MemorySystem,
    game::entities::{ACE, KING, Value},
};

const BASE_CHALLENGE: f32 = 0.25;
const SUSPICIOUS_BLUFF_RATE: f32 = 0.4;
const SUSPICION_BONUS: f32 = 0.2;
/// Added per card of the claimed value we hold ourselves.
const HELD_COPY_BONUS: f32 = 0.1;
/// Added per card beyond two in the contested placement.
const LARGE_PLAY_BONUS: f32 = 0.1;
const MIN_CHALLENGE: f32 = 0.1;
const MAX_CHALLENGE: f32 = 0.9;

const BASE_BLUFF: f32 = 0.5;
const PADDING_BLUFF: f32 = 0.3;

#[derive(Clone, Copy, Debug, Default)]
pub struct IntermediateStrategy;

impl StrategyPolicy for IntermediateStrategy {
    fn decide_challenge(
        &self,
        ctx: &DecisionContext<'_>,
        memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> bool {
        let Some((placer, count, declared)) = ctx.pending_claim() else {
            return false;
        };
        let personality = ctx.personality;
        let mut p = BASE_CHALLENGE + personality.challenge_modifier;
        if memory.bluff_probability(placer) > SUSPICIOUS_BLUFF_RATE {
            p += SUSPICION_BONUS;
        }
        p += HELD_COPY_BONUS * ctx.held(declared) as f32;
        if count >= 3 {
            p += LARGE_PLAY_BONUS * (count - 2) as f32;
        }
        p = p.clamp(MIN_CHALLENGE, MAX_CHALLENGE) + personality.noise(rng);
        chance(rng, p)
    }

    /// Follows the open claim when holding that value, sometimes padding the
    /// play with an off-value card. Otherwise plays the held value that has
    /// been declared most often, and bluffs about it: forced to when a
    /// different value is open, by choice otherwise.
    fn select_play(
        &self,
        ctx: &DecisionContext<'_>,
        memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> Play {
        let groups = group_by_value(ctx.hand);
        if groups.is_empty() {
            return joker_play(ctx, rng);
        }
        let personality = ctx.personality;
        let open_claim = ctx.view.open_claim;

        if let Some(claim) = open_claim
            && let Some(group) = groups.get(&claim)
        {
            let n = cards_to_play(group.len(), 2.0, personality.multi_card_modifier, rng);
            let mut cards = group[..n].to_vec();
            if chance(rng, PADDING_BLUFF + personality.bluff_modifier) {
                slip_extra_card(&mut cards, ctx.hand, claim, rng);
            }
            return Play {
                cards,
                declared: claim,
            };
        }

        let frequency = memory.declaration_counts();
        let best = groups
            .keys()
            .copied()
            .filter(|v| frequency.get(v).is_some_and(|c| *c > 0))
            .max_by_key(|v| frequency[v])
            .or_else(|| {
                groups
                    .iter()
                    .max_by_key(|(_, g)| g.len())
                    .map(|(v, _)| *v)
            })
            .unwrap_or(ACE);
        let group = groups.get(&best).map(Vec::as_slice).unwrap_or_default();
        let n = cards_to_play(group.len(), 2.0, personality.multi_card_modifier, rng);
        let cards = group[..n.min(group.len())].to_vec();

        let declared = match open_claim {
            Some(claim) => claim,
            None if chance(rng, BASE_BLUFF + personality.bluff_modifier) => neighbour(best, rng),
            None => best,
        };
        Play { cards, declared }
    }
}

/// A value one step away from `value`.
fn neighbour(value: Value, rng: &mut dyn RngCore) -> Value {
    match value {
        ACE => ACE + 1,
        KING => KING - 1,
        v if rng.random_bool(0.5) => v - 1,
        v => v + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bot::personality::{AGGRESSIVE, BALANCED, CAUTIOUS},
        game::{
            GameEngine,
            entities::{Action, Card, PlayerId},
        },
        testing::{cards, engine_with_hands, pid},
    };
    use rand::{SeedableRng, rngs::StdRng};

    /// Seat 0 places the first card of its hand declaring `declared`.
    fn after_placement(hands: &[Vec<Card>], declared: Value) -> GameEngine {
        let mut engine = engine_with_hands(hands);
        let card = engine.state().players[0].hand[0];
        engine
            .submit_action(
                &pid(0),
                Action::Place {
                    cards: vec![card],
                    declared,
                },
            )
            .unwrap();
        engine
    }

    fn challenge_count(engine: &GameEngine, me: &PlayerId, memory: &MemorySystem) -> usize {
        let view = engine.view_for(Some(me));
        let ctx = DecisionContext::new(&view, me, &BALANCED);
        let mut rng = StdRng::seed_from_u64(21);
        (0..1000)
            .filter(|_| IntermediateStrategy.decide_challenge(&ctx, memory, &mut rng))
            .count()
    }

    #[test]
    fn test_holding_claimed_copies_raises_suspicion() {
        let memory = MemorySystem::new(0.25);
        let me = pid(1);
        let empty_handed = after_placement(&[cards(0, &[7, 1, 2]), cards(3, &[3, 4, 5])], 7);
        let holding = after_placement(&[cards(0, &[7, 1, 2]), cards(3, &[7, 7, 7])], 7);

        // 0.45 versus 0.75.
        let base = challenge_count(&empty_handed, &me, &memory);
        let raised = challenge_count(&holding, &me, &memory);
        assert!(raised > base + 150, "{raised} vs {base}");
    }

    #[test]
    fn test_follows_open_claim_when_holding_it() {
        let engine = after_placement(&[cards(0, &[8, 1, 2, 3]), cards(4, &[8, 8, 4, 6])], 8);
        let me = pid(1);
        let view = engine.view_for(Some(&me));
        let ctx = DecisionContext::new(&view, &me, &CAUTIOUS);
        let memory = MemorySystem::new(0.2);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let play = IntermediateStrategy.select_play(&ctx, &memory, &mut rng);
            assert_eq!(play.declared, 8);
            assert!(play.cards.iter().filter(|c| c.value == 8).count() >= 1);
            assert!(play.cards.iter().filter(|c| c.value != 8).count() <= 1);
        }
    }

    #[test]
    fn test_forced_bluff_declares_open_claim() {
        let engine = after_placement(&[cards(0, &[8, 1, 2]), cards(3, &[4, 4, 6])], 8);
        let me = pid(1);
        let view = engine.view_for(Some(&me));
        let ctx = DecisionContext::new(&view, &me, &CAUTIOUS);
        let memory = MemorySystem::new(0.2);
        let mut rng = StdRng::seed_from_u64(6);

        for _ in 0..50 {
            let play = IntermediateStrategy.select_play(&ctx, &memory, &mut rng);
            assert_eq!(play.declared, 8);
            assert!(play.is_bluff());
        }
    }

    #[test]
    fn test_free_bluff_stays_near_true_value() {
        let engine = engine_with_hands(&[cards(0, &[6, 6, 6]), cards(3, &[1, 2, 3])]);
        let me = pid(0);
        let view = engine.view_for(Some(&me));
        let ctx = DecisionContext::new(&view, &me, &AGGRESSIVE);
        let memory = MemorySystem::new(0.15);
        let mut rng = StdRng::seed_from_u64(8);

        let mut bluffs = 0;
        for _ in 0..200 {
            let play = IntermediateStrategy.select_play(&ctx, &memory, &mut rng);
            assert!(play.cards.iter().all(|c| c.value == 6));
            assert!((5..=7).contains(&play.declared));
            if play.is_bluff() {
                bluffs += 1;
            }
        }
        // 80% for an aggressive bot.
        assert!(bluffs > 120, "{bluffs} bluffs");
    }

    #[test]
    fn test_neighbour_at_edges() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(neighbour(ACE, &mut rng), 2);
        assert_eq!(neighbour(KING, &mut rng), 12);
        for _ in 0..20 {
            let n = neighbour(7, &mut rng);
            assert!(n == 6 || n == 8);
        }
    }
}
