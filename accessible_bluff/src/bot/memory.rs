//! Per-bot memory of how every other player behaves.
//!
//! Each bot owns one `MemorySystem`. Observations arrive in two steps: the
//! public action as it happens ([`MemorySystem::record_action`]), then, for
//! challenged placements, the resolution once the cards are turned over
//! ([`MemorySystem::record_challenge_result`]). Statistics are exponential
//! averages blended with the owning personality's adaptive rate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::game::{
    constants::{CARDS_PER_RANK, RANKED_CARDS},
    entities::{ChallengeOutcome, GameView, KING, PlayerId, PublicAction, PublicActionKind, Value},
};

/// Most actions kept in the shared history.
pub const HISTORY_CAP: usize = 50;

/// Most actions kept per player profile.
pub const RECENT_CAP: usize = 10;

/// Resolved placements needed before the blended frequency is trusted.
const MIN_RESOLVED: u32 = 3;

const NEUTRAL: f32 = 0.5;
const NUDGE_PER_OBSERVATION: f32 = 0.05;
const TRUST_FLOOR: f32 = 0.1;
const TRUST_CEILING: f32 = 0.9;
const TRUST_DROP: f32 = 0.2;
const TRUST_GAIN: f32 = 0.1;

/// How often a player has declared one value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PatternStats {
    pub count: u32,
    /// Declarations of this value later checked by a challenge.
    pub resolved: u32,
    /// Declarations of this value proven false.
    pub bluff_count: u32,
}

#[derive(Clone, Debug)]
pub struct ObservedAction {
    pub action: PublicAction,
    /// Known only once a challenge reveals the cards.
    pub was_bluff: Option<bool>,
    pub observed_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub bluff_frequency: f32,
    pub challenge_success_frequency: f32,
    /// 0 means never truthful, 1 means always truthful.
    pub trust_score: f32,
    pub bluffs_exposed: u32,
    pub truths_shown: u32,
    pub challenges_won: u32,
    pub challenges_lost: u32,
    pub total_actions: u32,
    pub recent: VecDeque<ObservedAction>,
    pub patterns: BTreeMap<Value, PatternStats>,
}

impl PlayerProfile {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            bluff_frequency: NEUTRAL,
            challenge_success_frequency: NEUTRAL,
            trust_score: NEUTRAL,
            bluffs_exposed: 0,
            truths_shown: 0,
            challenges_won: 0,
            challenges_lost: 0,
            total_actions: 0,
            recent: VecDeque::with_capacity(RECENT_CAP),
            patterns: BTreeMap::new(),
        }
    }

    /// Placements by this player that a challenge has checked.
    pub fn resolved_placements(&self) -> u32 {
        self.bluffs_exposed + self.truths_shown
    }
}

/// Change in a player's bluffing between their early and recent play.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorShift {
    pub bluff_rate_change: f32,
}

impl BehaviorShift {
    pub fn is_more_aggressive(&self) -> bool {
        self.bluff_rate_change > 0.0
    }

    pub fn is_more_cautious(&self) -> bool {
        self.bluff_rate_change < 0.0
    }
}

#[derive(Clone, Debug)]
pub struct MemorySystem {
    adaptive_rate: f32,
    profiles: HashMap<PlayerId, PlayerProfile>,
    history: VecDeque<ObservedAction>,
    /// Unrevealed copies per value, indexed by value (slot 0 unused).
    remaining: [u8; KING as usize + 1],
}

impl MemorySystem {
    pub fn new(adaptive_rate: f32) -> Self {
        Self {
            adaptive_rate: adaptive_rate.clamp(f32::EPSILON, 1.0),
            profiles: HashMap::new(),
            history: VecDeque::with_capacity(HISTORY_CAP),
            remaining: [CARDS_PER_RANK; KING as usize + 1],
        }
    }

    pub fn adaptive_rate(&self) -> f32 {
        self.adaptive_rate
    }

    /// Create profiles for every id not yet known.
    pub fn initialize_players<'a>(&mut self, ids: impl IntoIterator<Item = &'a PlayerId>) {
        for id in ids {
            self.profiles
                .entry(id.clone())
                .or_insert_with(|| PlayerProfile::new(id.clone()));
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.profiles.is_empty()
    }

    pub fn profile(&self, id: &PlayerId) -> Option<&PlayerProfile> {
        self.profiles.get(id)
    }

    pub fn history(&self) -> &VecDeque<ObservedAction> {
        &self.history
    }

    /// Log an observed action.
    ///
    /// Placements bump the per-value pattern counter. When `was_bluff` is
    /// already known the bluff statistics are updated right away; challenges
    /// are only logged here, their effect is applied by
    /// [`MemorySystem::record_challenge_result`].
    pub fn record_action(&mut self, action: &PublicAction, was_bluff: Option<bool>) {
        let observed = ObservedAction {
            action: action.clone(),
            was_bluff,
            observed_at: Utc::now(),
        };
        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(observed.clone());

        let profile = self.profile_mut(&action.player);
        profile.total_actions += 1;
        if profile.recent.len() == RECENT_CAP {
            profile.recent.pop_front();
        }
        profile.recent.push_back(observed);

        if let PublicActionKind::Place { declared, .. } = action.kind {
            profile.patterns.entry(declared).or_default().count += 1;
            if let Some(was_bluff) = was_bluff {
                self.apply_bluff_observation(&action.player, declared, was_bluff);
            }
        }
    }

    /// Apply a resolved challenge: the placer's bluff statistics, the
    /// challenger's success rate and the revealed cards.
    pub fn record_challenge_result(&mut self, outcome: &ChallengeOutcome) {
        let was_bluff = outcome.was_successful;
        self.apply_bluff_observation(&outcome.target, outcome.declared, was_bluff);
        self.mark_last_placement(&outcome.target, was_bluff);

        let rate = self.adaptive_rate;
        let challenger = self.profile_mut(&outcome.challenger);
        let observation = if was_bluff {
            challenger.challenges_won += 1;
            1.0
        } else {
            challenger.challenges_lost += 1;
            0.0
        };
        challenger.challenge_success_frequency =
            blend(challenger.challenge_success_frequency, observation, rate);

        for card in outcome.revealed.iter().filter(|c| !c.is_joker()) {
            if let Some(slot) = self.remaining.get_mut(card.value as usize) {
                *slot = slot.saturating_sub(1);
            }
        }
    }

    /// Estimated chance that `id`'s declarations are false.
    ///
    /// Returns the blended frequency once three placements have been
    /// resolved. Before that, a small nudge from the raw counts, kept
    /// between neutral and the blended frequency so the estimate only moves
    /// in the direction of the evidence.
    pub fn bluff_probability(&self, id: &PlayerId) -> f32 {
        let Some(profile) = self.profiles.get(id) else {
            return NEUTRAL;
        };
        if profile.resolved_placements() >= MIN_RESOLVED {
            return profile.bluff_frequency;
        }
        let nudge = NEUTRAL
            + (profile.bluffs_exposed as f32 - profile.truths_shown as f32) * NUDGE_PER_OBSERVATION;
        let low = NEUTRAL.min(profile.bluff_frequency);
        let high = NEUTRAL.max(profile.bluff_frequency);
        nudge.clamp(low, high)
    }

    pub fn trust_score(&self, id: &PlayerId) -> f32 {
        self.profiles.get(id).map_or(NEUTRAL, |p| p.trust_score)
    }

    pub fn challenge_success_rate(&self, id: &PlayerId) -> f32 {
        self.profiles
            .get(id)
            .map_or(NEUTRAL, |p| p.challenge_success_frequency)
    }

    /// Chance that `id` is lying when declaring `value`. Uses the player's
    /// checked declarations of that value when there are any, otherwise
    /// blends the general bluff probability with how scarce the value is.
    pub fn card_bluff_probability(&self, id: &PlayerId, value: Value) -> f32 {
        let Some(profile) = self.profiles.get(id) else {
            return NEUTRAL;
        };
        if let Some(pattern) = profile.patterns.get(&value)
            && pattern.resolved > 0
        {
            return pattern.bluff_count as f32 / pattern.resolved as f32;
        }
        let scarcity = 1.0 - self.remaining_of(value) as f32 / CARDS_PER_RANK as f32;
        self.bluff_probability(id) * 0.7 + scarcity * 0.3
    }

    /// Copies of `value` not yet revealed by a challenge.
    pub fn remaining_of(&self, value: Value) -> u8 {
        self.remaining.get(value as usize).copied().unwrap_or(0)
    }

    /// 0 at the deal, approaching 1 as hands empty.
    pub fn game_stage_estimate(&self, view: &GameView) -> f32 {
        if view.players.is_empty() {
            return 0.0;
        }
        let initial = if view.initial_hand_size > 0 {
            view.initial_hand_size as f32
        } else {
            RANKED_CARDS as f32 / view.players.len() as f32
        };
        (1.0 - view.average_hand_size() / initial).clamp(0.0, 1.0)
    }

    /// Compare a player's early resolved placements with their recent ones.
    /// `None` until there is enough to compare.
    pub fn behavior_shift(&self, id: &PlayerId) -> Option<BehaviorShift> {
        let profile = self.profiles.get(id)?;
        if profile.total_actions < 5 {
            return None;
        }
        let early: Vec<bool> = self
            .history
            .iter()
            .filter(|o| &o.action.player == id)
            .filter_map(|o| o.was_bluff)
            .take(5.min(profile.total_actions as usize / 2))
            .collect();
        let recent: Vec<bool> = profile
            .recent
            .iter()
            .rev()
            .filter_map(|o| o.was_bluff)
            .take(5)
            .collect();
        if early.is_empty() || recent.is_empty() {
            return None;
        }
        Some(BehaviorShift {
            bluff_rate_change: bluff_rate(&recent) - bluff_rate(&early),
        })
    }

    /// How often each value was declared across the remembered history.
    pub fn declaration_counts(&self) -> HashMap<Value, u32> {
        let mut counts = HashMap::new();
        for (_, declared) in self.history.iter().filter_map(|o| o.action.placement()) {
            *counts.entry(declared).or_insert(0) += 1;
        }
        counts
    }

    /// Values declared in the last `n` remembered actions.
    pub fn recent_declarations(&self, n: usize) -> Vec<Value> {
        self.history
            .iter()
            .rev()
            .take(n)
            .filter_map(|o| o.action.placement().map(|(_, declared)| declared))
            .collect()
    }

    /// Forget everything, ready for a new game.
    pub fn reset(&mut self) {
        self.profiles.clear();
        self.history.clear();
        self.remaining = [CARDS_PER_RANK; KING as usize + 1];
    }

    fn profile_mut(&mut self, id: &PlayerId) -> &mut PlayerProfile {
        self.profiles
            .entry(id.clone())
            .or_insert_with(|| PlayerProfile::new(id.clone()))
    }

    fn apply_bluff_observation(&mut self, id: &PlayerId, declared: Value, was_bluff: bool) {
        let rate = self.adaptive_rate;
        let profile = self.profile_mut(id);
        let pattern = profile.patterns.entry(declared).or_default();
        pattern.resolved += 1;
        if was_bluff {
            pattern.bluff_count += 1;
            profile.bluffs_exposed += 1;
            profile.trust_score -= rate * TRUST_DROP;
        } else {
            profile.truths_shown += 1;
            profile.trust_score += rate * TRUST_GAIN;
        }
        profile.trust_score = profile.trust_score.clamp(TRUST_FLOOR, TRUST_CEILING);
        let observation = if was_bluff { 1.0 } else { 0.0 };
        profile.bluff_frequency = blend(profile.bluff_frequency, observation, rate);
    }

    /// Attach the now-known truthfulness to the player's latest unresolved
    /// placement in both logs.
    fn mark_last_placement(&mut self, id: &PlayerId, was_bluff: bool) {
        let is_open_placement = |o: &&mut ObservedAction| {
            &o.action.player == id && o.was_bluff.is_none() && o.action.placement().is_some()
        };
        if let Some(entry) = self.history.iter_mut().rev().find(is_open_placement) {
            entry.was_bluff = Some(was_bluff);
        }
        if let Some(profile) = self.profiles.get_mut(id)
            && let Some(entry) = profile.recent.iter_mut().rev().find(is_open_placement)
        {
            entry.was_bluff = Some(was_bluff);
        }
    }
}

fn blend(current: f32, observation: f32, rate: f32) -> f32 {
    current * (1.0 - rate) + observation * rate
}

fn bluff_rate(observations: &[bool]) -> f32 {
    observations.iter().filter(|b| **b).count() as f32 / observations.len() as f32
}
