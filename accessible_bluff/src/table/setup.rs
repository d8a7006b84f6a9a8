//! Seating humans and bots at a new game.

use log::info;
use rand::Rng;

use crate::{
    bot::{BotDifficulty, BotOrchestrator},
    game::{
        GameEngine, GameSettings,
        constants::MIN_PLAYERS,
        entities::PlayerId,
        errors::{SetupError, SetupResult},
    },
};

/// An engine with everyone seated and the bots that play for some of them.
#[derive(Debug)]
pub struct GameSetup {
    pub engine: GameEngine,
    pub bots: BotOrchestrator,
}

/// Seat `humans` in the given order followed by `bot_count` bots. The game
/// is left waiting to be dealt.
///
/// # Arguments
///
/// * `humans` - Id and display name of every human player
/// * `bot_count` - Bots to add after the humans
/// * `difficulty` - Difficulty of every bot
/// * `settings` - Deck and table limits
/// * `seed` - Base seed for the bots' random sources
pub fn seat_players(
    humans: &[(PlayerId, String)],
    bot_count: usize,
    difficulty: BotDifficulty,
    settings: GameSettings,
    seed: Option<u64>,
) -> SetupResult<GameSetup> {
    let total = humans.len() + bot_count;
    if total < MIN_PLAYERS {
        return Err(SetupError::NotEnoughPlayers { min: MIN_PLAYERS });
    }
    if total > settings.max_players {
        return Err(SetupError::TooManyPlayers {
            max: settings.max_players,
        });
    }

    let mut engine = GameEngine::new(settings);
    for (id, name) in humans {
        engine.add_player(id.clone(), name, false)?;
    }
    let mut bots = BotOrchestrator::new();
    for config in bots.create_bots(difficulty, bot_count, seed) {
        engine.add_player(config.id, &config.name, true)?;
    }
    Ok(GameSetup { engine, bots })
}

/// Seat everyone and deal.
pub fn create_game<R: Rng + ?Sized>(
    humans: &[(PlayerId, String)],
    bot_count: usize,
    difficulty: BotDifficulty,
    settings: GameSettings,
    seed: Option<u64>,
    rng: &mut R,
) -> SetupResult<GameSetup> {
    let mut setup = seat_players(humans, bot_count, difficulty, settings, seed)?;
    setup.engine.start(rng)?;
    info!(
        "Created game {} with {} human(s) and {} {} bot(s)",
        setup.engine.state().game_id,
        humans.len(),
        bot_count,
        difficulty
    );
    Ok(setup)
}
