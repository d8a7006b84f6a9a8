//! A single bot player.

use chrono::{DateTime, Utc};
use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;

use super::{
    memory::MemorySystem,
    models::{BotConfig, BotDifficulty, BotStats, DifficultyParams},
    personality::{LineKind, Personality, PersonalityKind},
    strategy::{DecisionContext, Strategy, StrategyPolicy},
};
use crate::game::entities::{
    Action, ActionKind, ChallengeOutcome, GameStage, GameView, PlayerId, PublicAction,
};

/// Shortest think time regardless of preset.
pub const MIN_THINK_TIME_MS: u64 = 500;

const BASE_PASS: f32 = 0.2;
const PASS_DAMPING_STEP: f32 = 0.15;
const MIN_PASS: f32 = 0.05;
const MAX_PASS: f32 = 0.5;
/// Consecutive challenges after which the next one is damped.
const CHALLENGE_STREAK: u32 = 2;
const CHALLENGE_DECLINE: f64 = 0.7;

/// What a bot wants to do, plus something to say about it.
#[derive(Clone, Debug, PartialEq)]
pub struct BotDecision {
    pub action: Action,
    pub flavor: Option<&'static str>,
}

/// Counters over the bot's own applied actions, used to keep it from
/// repeating itself.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RepetitionDamping {
    consecutive_challenges: u32,
    consecutive_passes: u32,
}

impl RepetitionDamping {
    pub fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Challenge => {
                self.consecutive_challenges += 1;
                self.consecutive_passes = 0;
            }
            ActionKind::Pass => {
                self.consecutive_passes += 1;
                self.consecutive_challenges = 0;
            }
            ActionKind::Place => *self = Self::default(),
        }
    }

    pub fn consecutive_challenges(&self) -> u32 {
        self.consecutive_challenges
    }

    pub fn consecutive_passes(&self) -> u32 {
        self.consecutive_passes
    }

    /// After a streak of challenges, usually talk the bot out of another
    /// one. Declining resets the streak.
    pub fn suppress_challenge<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.consecutive_challenges >= CHALLENGE_STREAK && rng.random_bool(CHALLENGE_DECLINE) {
            self.consecutive_challenges = 0;
            return true;
        }
        false
    }

    pub fn pass_probability(&self, personality: &Personality) -> f32 {
        let mut p = BASE_PASS + personality.pass_modifier;
        if self.consecutive_passes >= 1 {
            // The pass being considered counts toward the streak.
            p -= PASS_DAMPING_STEP * (self.consecutive_passes + 1) as f32;
        }
        p.clamp(MIN_PASS, MAX_PASS)
    }
}

#[derive(Debug)]
pub struct BotAgent {
    config: BotConfig,
    personality: &'static Personality,
    memory: MemorySystem,
    strategy: Strategy,
    damping: RepetitionDamping,
    params: DifficultyParams,
    rng: StdRng,
    stats: BotStats,
    /// Sequence number of the newest action fed to memory.
    last_observed_seq: u64,
    last_action_at: Option<DateTime<Utc>>,
}

impl BotAgent {
    /// Create a bot with a personality drawn for its difficulty.
    pub fn new(config: BotConfig) -> Self {
        let mut rng = seeded_rng(config.seed);
        let kind = PersonalityKind::for_difficulty(config.difficulty, &mut rng);
        Self::build(config, kind, rng)
    }

    pub fn with_personality(config: BotConfig, kind: PersonalityKind) -> Self {
        let rng = seeded_rng(config.seed);
        Self::build(config, kind, rng)
    }

    fn build(config: BotConfig, kind: PersonalityKind, rng: StdRng) -> Self {
        let personality = kind.personality();
        Self {
            memory: MemorySystem::new(personality.adaptive_rate),
            strategy: Strategy::for_difficulty(config.difficulty),
            params: DifficultyParams::from_difficulty(config.difficulty),
            personality,
            config,
            damping: RepetitionDamping::default(),
            rng,
            stats: BotStats::default(),
            last_observed_seq: 0,
            last_action_at: None,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.config.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn difficulty(&self) -> BotDifficulty {
        self.config.difficulty
    }

    pub fn personality(&self) -> &'static Personality {
        self.personality
    }

    pub fn memory(&self) -> &MemorySystem {
        &self.memory
    }

    pub fn damping(&self) -> &RepetitionDamping {
        &self.damping
    }

    pub fn stats(&self) -> &BotStats {
        &self.stats
    }

    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        self.last_action_at
    }

    /// Feed an applied action into memory. Each action is recorded once no
    /// matter how often it is offered.
    pub fn observe(&mut self, view: &GameView, action: &PublicAction) {
        if !self.memory.is_initialized() {
            self.memory
                .initialize_players(view.players.iter().map(|p| &p.id));
        }
        if action.seq <= self.last_observed_seq {
            return;
        }
        self.last_observed_seq = action.seq;
        self.memory.record_action(action, None);
        if action.player == self.config.id {
            self.damping.record(action.action_kind());
        }
    }

    pub fn update_with_challenge_result(&mut self, outcome: &ChallengeOutcome) {
        self.memory.record_challenge_result(outcome);
        let me = &self.config.id;
        if &outcome.challenger == me && outcome.was_successful {
            self.stats.challenges_won += 1;
        }
        if &outcome.target == me && outcome.was_successful {
            self.stats.times_caught += 1;
        }
        if &outcome.receiver == me {
            self.stats.cards_picked_up += outcome.pile_size as u32;
        }
    }

    /// Decide what to do given the bot's view of the table.
    ///
    /// A pending claim from someone else is considered for a challenge
    /// first. Otherwise, on the bot's turn, it either passes or places.
    /// Returns `None` when there is nothing the bot wants to or may do.
    pub fn decide(&mut self, view: &GameView) -> Option<BotDecision> {
        if view.stage != GameStage::Playing {
            return None;
        }
        let ctx = DecisionContext::new(view, &self.config.id, self.personality);

        if ctx.pending_claim().is_some()
            && self
                .strategy
                .decide_challenge(&ctx, &self.memory, &mut self.rng)
        {
            if self.damping.suppress_challenge(&mut self.rng) {
                debug!("{} talks itself out of another challenge", self.config.id);
            } else {
                self.stats.challenges_made += 1;
                return Some(self.finish(Action::Challenge));
            }
        }

        if !view.is_turn_of(&self.config.id) || view.hand.is_empty() {
            return None;
        }

        let pass_probability = self.damping.pass_probability(self.personality);
        if view.pile_size > 0 && self.rng.random_bool(f64::from(pass_probability)) {
            self.stats.passes += 1;
            return Some(self.finish(Action::Pass));
        }

        let play = self
            .strategy
            .select_play(&ctx, &self.memory, &mut self.rng);
        self.stats.placements += 1;
        if play.is_bluff() {
            self.stats.bluffs += 1;
        }
        debug!(
            "{} places {} card(s) as {} (bluff: {})",
            self.config.id,
            play.cards.len(),
            play.declared,
            play.is_bluff()
        );
        Some(self.finish(play.into_action()))
    }

    fn finish(&mut self, action: Action) -> BotDecision {
        self.last_action_at = Some(Utc::now());
        let flavor = self
            .personality
            .line(LineKind::from(action.kind()), &mut self.rng);
        BotDecision { action, flavor }
    }

    /// Thinking time for the next decision: the preset's base plus or minus
    /// its variance, never below [`MIN_THINK_TIME_MS`].
    pub fn think_delay(&mut self) -> Duration {
        let base = self.params.base_think_time_ms as i64;
        let variance = self.params.think_time_variance_ms as i64;
        let jitter = if variance > 0 {
            self.rng.random_range(-variance..=variance)
        } else {
            0
        };
        let ms = (base + jitter).max(MIN_THINK_TIME_MS as i64) as u64;
        Duration::from_millis(ms)
    }

    /// Count the finished game and pick something to say about it.
    pub fn record_game_over(&mut self, winner: &PlayerId) -> Option<&'static str> {
        self.stats.games_played += 1;
        let kind = if winner == &self.config.id {
            self.stats.games_won += 1;
            LineKind::Win
        } else {
            LineKind::Lose
        };
        self.personality.line(kind, &mut self.rng)
    }

    /// Forget the previous game. Statistics are kept.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.damping = RepetitionDamping::default();
        self.last_observed_seq = 0;
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bot::personality::{AGGRESSIVE, BALANCED, CAUTIOUS},
        game::{GameEngine, entities::Card},
        testing::{cards, engine_with_hands, pid},
    };

    fn agent(seat: usize, difficulty: BotDifficulty, kind: PersonalityKind) -> BotAgent {
        let config = BotConfig {
            id: pid(seat),
            name: format!("P{seat}"),
            difficulty,
            seed: Some(seat as u64 + 100),
        };
        BotAgent::with_personality(config, kind)
    }

    fn place_first(engine: &mut GameEngine, seat: usize, declared: u8) {
        let card = engine.state().players[seat].hand[0];
        engine
            .submit_action(
                &pid(seat),
                Action::Place {
                    cards: vec![card],
                    declared,
                },
            )
            .unwrap();
    }

    #[test]
    fn test_pass_probability_damping() {
        let mut damping = RepetitionDamping::default();
        assert!((damping.pass_probability(&BALANCED) - 0.2).abs() < 1e-6);
        assert!((damping.pass_probability(&CAUTIOUS) - 0.3).abs() < 1e-6);

        // A single pass already cuts the next one: 0.3 - 0.15 * 2 = 0.
        damping.record(ActionKind::Pass);
        assert!((damping.pass_probability(&BALANCED) - MIN_PASS).abs() < 1e-6);
        assert!((damping.pass_probability(&CAUTIOUS) - MIN_PASS).abs() < 1e-6);
        damping.record(ActionKind::Pass);
        assert!((damping.pass_probability(&BALANCED) - MIN_PASS).abs() < 1e-6);

        damping.record(ActionKind::Place);
        assert_eq!(damping.consecutive_passes(), 0);
        assert!((damping.pass_probability(&AGGRESSIVE) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_challenge_streak_is_damped() {
        let mut rng = StdRng::seed_from_u64(8);
        let trials = 1000;
        let mut suppressed = 0;
        for _ in 0..trials {
            let mut damping = RepetitionDamping::default();
            damping.record(ActionKind::Challenge);
            assert!(!damping.suppress_challenge(&mut rng));
            damping.record(ActionKind::Challenge);
            if damping.suppress_challenge(&mut rng) {
                suppressed += 1;
                assert_eq!(damping.consecutive_challenges(), 0);
            }
        }
        assert!((600..800).contains(&suppressed), "{suppressed} suppressed");
    }

    #[test]
    fn test_off_turn_bot_only_considers_challenging() {
        // Seat 0 places, seat 1 is on turn, seat 2 is off turn.
        let mut engine = engine_with_hands(&[
            cards(0, &[1, 2, 3]),
            cards(3, &[4, 5, 6]),
            cards(6, &[7, 8, 9]),
        ]);
        place_first(&mut engine, 0, 1);
        let mut bot = agent(2, BotDifficulty::Beginner, PersonalityKind::Balanced);
        let view = engine.view_for(Some(bot.id()));

        for _ in 0..100 {
            if let Some(decision) = bot.decide(&view) {
                assert_eq!(decision.action, Action::Challenge);
            }
        }
        assert!(bot.stats().challenges_made > 0);
        assert_eq!(bot.stats().placements, 0);
    }

    #[test]
    fn test_on_turn_bot_always_acts() {
        let engine = engine_with_hands(&[cards(0, &[1, 2, 3]), cards(3, &[4, 5, 6])]);
        for difficulty in [
            BotDifficulty::Beginner,
            BotDifficulty::Intermediate,
            BotDifficulty::Advanced,
        ] {
            for kind in PersonalityKind::ALL {
                let mut bot = agent(0, difficulty, kind);
                let view = engine.view_for(Some(bot.id()));
                let decision = bot.decide(&view).expect("bot on turn must act");
                // Nothing on the pile yet, so no pass and nothing to challenge.
                match decision.action {
                    Action::Place { cards, declared } => {
                        assert!(!cards.is_empty());
                        assert!(cards.iter().all(|c| view.hand.contains(c)));
                        assert!((1..=13).contains(&declared));
                    }
                    other => panic!("unexpected {other:?}"),
                }
                assert!(decision.flavor.is_some());
            }
        }
    }

    #[test]
    fn test_decisions_are_accepted_by_engine() {
        let mut engine = engine_with_hands(&[cards(0, &[1, 2, 3, 4]), cards(4, &[5, 6, 7, 8])]);
        let mut bots = [
            agent(0, BotDifficulty::Advanced, PersonalityKind::Aggressive),
            agent(1, BotDifficulty::Intermediate, PersonalityKind::Unpredictable),
        ];
        for _ in 0..50 {
            if engine.is_finished() {
                break;
            }
            let current = engine.state().current;
            let view = engine.view_for(Some(bots[current].id()));
            let decision = bots[current].decide(&view).expect("on-turn decision");
            let id = bots[current].id().clone();
            let record = engine.submit_action(&id, decision.action).unwrap();
            let public = record.to_public();
            for bot in bots.iter_mut() {
                let view = engine.view_for(Some(bot.id()));
                bot.observe(&view, &public);
                if let Some(outcome) = record.challenge_outcome() {
                    bot.update_with_challenge_result(outcome);
                }
            }
            assert!(engine.accounting().is_conserved());
        }
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut engine = engine_with_hands(&[cards(0, &[1, 2]), cards(2, &[3, 4])]);
        place_first(&mut engine, 0, 1);
        let mut bot = agent(1, BotDifficulty::Advanced, PersonalityKind::Balanced);
        let view = engine.view_for(Some(bot.id()));
        let action = view.last_action.clone().unwrap();
        bot.observe(&view, &action);
        bot.observe(&view, &action);
        assert_eq!(bot.memory().history().len(), 1);
        assert_eq!(bot.memory().profile(&pid(0)).unwrap().total_actions, 1);
    }

    #[test]
    fn test_game_over_and_reset() {
        let mut bot = agent(0, BotDifficulty::Beginner, PersonalityKind::Cautious);
        assert!(bot.record_game_over(&pid(0)).is_some());
        assert!(bot.record_game_over(&pid(1)).is_some());
        assert_eq!(bot.stats().games_played, 2);
        assert_eq!(bot.stats().games_won, 1);

        bot.reset();
        assert!(!bot.memory().is_initialized());
        assert_eq!(bot.stats().games_played, 2);
    }

    #[test]
    fn test_think_delay_within_preset() {
        let mut bot = agent(0, BotDifficulty::Advanced, PersonalityKind::Balanced);
        for _ in 0..100 {
            let ms = bot.think_delay().as_millis() as u64;
            assert!((1100..=2500).contains(&ms));
        }
    }

    #[test]
    fn test_challenge_outcome_updates_stats() {
        let mut bot = agent(1, BotDifficulty::Intermediate, PersonalityKind::Balanced);
        let outcome = ChallengeOutcome {
            challenger: pid(1),
            target: pid(0),
            declared: 5,
            revealed: vec![Card::joker(52)],
            was_successful: false,
            receiver: pid(1),
            pile_size: 4,
        };
        bot.update_with_challenge_result(&outcome);
        assert_eq!(bot.stats().challenges_won, 0);
        assert_eq!(bot.stats().cards_picked_up, 4);
    }
}
