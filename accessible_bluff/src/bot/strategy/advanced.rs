//! Advanced tier.
//!
//! Challenges weigh the placer's track record, its trust score, how
//! plausible the claim is given the bot's own hand, the stage of the game
//! and how close either side is to winning. Claims that cannot be true are
//! always challenged. Placements are chosen by scoring every held value
//! against what opponents probably hold and what has been declared, and
//! bluffs pick the least suspicious value to declare.

use rand::{Rng, RngCore};
use std::cmp::Ordering;

use super::{
    DecisionContext, Play, StrategyPolicy, cards_to_play, chance, group_by_value, joker_play,
    other_rank, slip_extra_card,
};
use crate::{
    bot::memory::MemorySystem,
    game::{
        constants::CARDS_PER_RANK,
        entities::{Card, Value, ranks},
    },
};

const BASE_CHALLENGE: f32 = 0.2;
const HIGH_BLUFF_RATE: f32 = 0.6;
const HIGH_BLUFF_BONUS: f32 = 0.3;
const DISTRUST_WEIGHT: f32 = 0.4;
const DOUBT_WEIGHT: f32 = 0.3;
const STAGE_ADJUSTMENT: f32 = 0.1;
const NEAR_WIN_CARDS: usize = 3;
const TARGET_NEAR_WIN_BONUS: f32 = 0.2;
const SELF_NEAR_WIN_PENALTY: f32 = 0.15;
const SHIFT_BONUS: f32 = 0.05;
const MIN_CHALLENGE: f32 = 0.1;
const MAX_CHALLENGE: f32 = 0.9;

const PADDING_BLUFF: f32 = 0.4;
const BASE_BLUFF: f32 = 0.7;
const LATE_STAGE: f32 = 0.7;
const JOKER_STAGE: f32 = 0.5;
/// Candidates a bluff value is drawn from.
const BLUFF_SHORTLIST: usize = 3;
const RECENT_WINDOW: usize = 5;

#[derive(Clone, Copy, Debug, Default)]
pub struct AdvancedStrategy;

impl StrategyPolicy for AdvancedStrategy {
    fn decide_challenge(
        &self,
        ctx: &DecisionContext<'_>,
        memory: &MemorySystem,
        rng: &mut dyn RngCore,
    ) -> bool {
        let Some((placer, count, declared)) = ctx.pending_claim() else {
            return false;
        };
        let held = ctx.held(declared);
        let obtainable = usize::from(CARDS_PER_RANK).saturating_sub(held) + ctx.view.possible_jokers();
        if count > obtainable {
            return true;
        }

        let personality = ctx.personality;
        let stage = memory.game_stage_estimate(ctx.view);
        let mut p = BASE_CHALLENGE + personality.challenge_modifier;
        if memory.bluff_probability(placer) > HIGH_BLUFF_RATE {
            p += HIGH_BLUFF_BONUS;
        }
        p += (1.0 - memory.trust_score(placer)) * DISTRUST_WEIGHT;
        let truth = claim_truth_probability(
            held,
            count,
            stage,
            memory.card_bluff_probability(placer, declared),
        );
        p += (1.0 - truth) * DOUBT_WEIGHT;
        if stage < 0.3 {
            p -= STAGE_ADJUSTMENT;
        } else if stage > LATE_STAGE {
            p += STAGE_ADJUSTMENT;
        }
        if ctx.view.card_count_of(placer) <= NEAR_WIN_CARDS {
            p += TARGET_NEAR_WIN_BONUS;
        }
        if ctx.hand.len() <= NEAR_WIN_CARDS {
            p -= SELF_NEAR_WIN_PENALTY;
        }
        if memory
            .behavior_shift(placer)
            .is_some_and(|shift| shift.is_more_aggressive())
        {
            p += SHIFT_BONUS;
        }
        p *= personality.risk_tolerance * 2.0;
        p = p.clamp(MIN_CHALLENGE, MAX_CHALLENGE) + personality.noise(rng);
        chance(rng, p)
    }

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
        let stage = memory.game_stage_estimate(ctx.view);
        let spread = (stage * 5.0).min(3.0);
        let open_claim = ctx.view.open_claim;

        if let Some(claim) = open_claim
            && let Some(group) = groups.get(&claim)
        {
            let n = cards_to_play(group.len(), spread, personality.multi_card_modifier, rng);
            let mut cards = group[..n].to_vec();
            if chance(rng, PADDING_BLUFF + personality.bluff_modifier) {
                slip_extra_card(&mut cards, ctx.hand, claim, rng);
            } else if stage > JOKER_STAGE {
                add_joker(&mut cards, ctx);
            }
            return Play {
                cards,
                declared: claim,
            };
        }

        let others = others_holding(ctx, memory);
        let frequency = memory.declaration_counts();
        let mut scored: Vec<(Value, f32)> = groups
            .iter()
            .map(|(value, group)| {
                let size = group.len() as f32;
                let mut score = size * 2.0 - f32::from(others[*value as usize]) * 0.5;
                if stage > LATE_STAGE && group.len() >= 3 {
                    score += 3.0;
                }
                score += frequency.get(value).copied().unwrap_or(0) as f32 * 0.5;
                (*value, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let best = scored[0].0;
        let group = &groups[&best];
        let n = cards_to_play(group.len(), spread, personality.multi_card_modifier, rng);
        let mut cards = group[..n].to_vec();

        let declared = match open_claim {
            Some(claim) => claim,
            None if chance(rng, BASE_BLUFF + personality.bluff_modifier) => {
                let value = bluff_value(ctx, &others, memory, rng);
                if value == best {
                    other_rank(best, rng)
                } else {
                    value
                }
            }
            None => {
                if stage > JOKER_STAGE {
                    add_joker(&mut cards, ctx);
                }
                best
            }
        };
        Play { cards, declared }
    }
}

/// Chance a claim of `count` cards is honest, from our own holding of the
/// value, the size of the claim, how late it is and what we know about the
/// placer's record with this value.
fn claim_truth_probability(held: usize, count: usize, stage: f32, placer_bluff: f32) -> f32 {
    let mut truth = 0.7 - 0.1 * held as f32;
    if count >= 3 {
        truth -= 0.1 * (count - 2) as f32;
    }
    truth -= stage * 0.2;
    truth = truth * 0.7 + (1.0 - placer_bluff) * 0.3;
    truth.clamp(0.1, 0.9)
}

/// Unrevealed copies of each value that are not in our hand, indexed by
/// value.
fn others_holding(ctx: &DecisionContext<'_>, memory: &MemorySystem) -> [u8; 14] {
    let mut others = [0u8; 14];
    for value in ranks() {
        let held = u8::try_from(ctx.held(value)).unwrap_or(u8::MAX);
        others[value as usize] = memory.remaining_of(value).saturating_sub(held);
    }
    others
}

/// Value to declare for a bluff: favors values we really hold (so the
/// claim is partly true), values opponents are short of, and values that
/// are being declared right now.
fn bluff_value(
    ctx: &DecisionContext<'_>,
    others: &[u8; 14],
    memory: &MemorySystem,
    rng: &mut dyn RngCore,
) -> Value {
    let recent = memory.recent_declarations(RECENT_WINDOW);
    let mut scored: Vec<(Value, f32)> = ranks()
        .map(|value| {
            let score = 5.0 + ctx.held(value) as f32 * 2.0 - f32::from(others[value as usize])
                + recent.iter().filter(|v| **v == value).count() as f32;
            (value, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let pick = rng.random_range(0..BLUFF_SHORTLIST.min(scored.len()));
    scored[pick].0
}

fn add_joker(cards: &mut Vec<Card>, ctx: &DecisionContext<'_>) {
    if let Some(joker) = ctx.hand.iter().find(|c| c.is_joker()) {
        cards.push(*joker);
    }
}
