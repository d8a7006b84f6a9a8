//! Beginner tier: fixed base rates, no use of memory.

use rand::RngCore;

use super::{
    DecisionContext, Play, StrategyPolicy, cards_to_play, chance, group_by_value, joker_play,
    random_rank,
};
use crate::bot::memory::MemorySystem;

const BASE_CHALLENGE: f32 = 0.2;
const BASE_BLUFF: f32 = 0.2;

#[derive(Clone, Copy, Debug, Default)]
pub struct BeginnerStrategy;

impl StrategyPolicy for BeginnerStrategy {
    fn decide_challenge(
        &self,
        ctx: &DecisionContext<'_>,
        _memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> bool {
        if ctx.pending_claim().is_none() {
            return false;
        }
        chance(rng, BASE_CHALLENGE + ctx.personality.challenge_modifier)
    }

    /// Puts down one or two cards of the lowest value held and usually
    /// declares them truthfully. The open claim is ignored.
    fn select_play(
        &self,
        ctx: &DecisionContext<'_>,
        _memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> Play {
        let groups = group_by_value(ctx.hand);
        let Some((&value, group)) = groups.iter().next() else {
            return joker_play(ctx, rng);
        };
        let personality = ctx.personality;
        let n = cards_to_play(group.len(), 2.0, personality.multi_card_modifier, rng);
        let declared = if chance(rng, BASE_BLUFF + personality.bluff_modifier) {
            random_rank(rng)
        } else {
            value
        };
        Play {
            cards: group[..n].to_vec(),
            declared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bot::personality::{AGGRESSIVE, BALANCED, CAUTIOUS},
        game::entities::{Action, Card},
        testing::{cards, engine_with_hands, pid},
    };
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_beginner_plays_lowest_group() {
        let engine = engine_with_hands(&[cards(0, &[9, 4, 4, 11]), cards(4, &[2, 2, 3, 3])]);
        let me = pid(0);
        let view = engine.view_for(Some(&me));
        let ctx = DecisionContext::new(&view, &me, &CAUTIOUS);
        let memory = MemorySystem::new(CAUTIOUS.adaptive_rate);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..100 {
            let play = BeginnerStrategy.select_play(&ctx, &memory, &mut rng);
            assert!(!play.cards.is_empty() && play.cards.len() <= 2);
            assert!(play.cards.iter().all(|c| c.value == 4));
            assert!(play.cards.iter().all(|c| view.hand.contains(c)));
        }
    }

    #[test]
    fn test_beginner_never_challenges_without_claim() {
        let engine = engine_with_hands(&[cards(0, &[1, 2]), cards(2, &[3, 4])]);
        let me = pid(1);
        let view = engine.view_for(Some(&me));
        let ctx = DecisionContext::new(&view, &me, &AGGRESSIVE);
        let memory = MemorySystem::new(0.15);
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| !BeginnerStrategy.decide_challenge(&ctx, &memory, &mut rng)));
    }

    #[test]
    fn test_beginner_challenge_rate_follows_personality() {
        let mut engine = engine_with_hands(&[cards(0, &[1, 2]), cards(2, &[3, 4])]);
        let card = engine.state().players[0].hand[0];
        engine
            .submit_action(
                &pid(0),
                Action::Place {
                    cards: vec![card],
                    declared: 1,
                },
            )
            .unwrap();
        let me = pid(1);
        let view = engine.view_for(Some(&me));
        let memory = MemorySystem::new(0.25);
        let mut rng = StdRng::seed_from_u64(77);
        let trials = 1000;

        let mut rate = |personality| {
            let ctx = DecisionContext::new(&view, &me, personality);
            (0..trials)
                .filter(|_| BeginnerStrategy.decide_challenge(&ctx, &memory, &mut rng))
                .count()
        };
        let cautious = rate(&CAUTIOUS);
        let balanced = rate(&BALANCED);
        let aggressive = rate(&AGGRESSIVE);
        // 5%, 20% and 45%.
        assert!(cautious < 100, "cautious challenged {cautious} times");
        assert!((120..300).contains(&balanced), "balanced challenged {balanced} times");
        assert!(aggressive > 350, "aggressive challenged {aggressive} times");
    }

    #[test]
    fn test_beginner_with_only_jokers() {
        let hands = [
            vec![Card::joker(52), Card::joker(53)],
            cards(0, &[5, 6]),
        ];
        let engine = engine_with_hands(&hands);
        let me = pid(0);
        let view = engine.view_for(Some(&me));
        let ctx = DecisionContext::new(&view, &me, &BALANCED);
        let memory = MemorySystem::new(0.25);
        let mut rng = StdRng::seed_from_u64(4);
        let play = BeginnerStrategy.select_play(&ctx, &memory, &mut rng);
        assert!(play.cards.iter().all(Card::is_joker));
        assert!(!play.is_bluff());
    }
}
