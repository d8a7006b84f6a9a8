//! Headless Bluff tables played entirely by bots.
//!
//! Each game runs in its own TableActor with a logging narrator attached.
//! The runner subscribes to the table's events, waits for the game to end
//! and prints a summary of who won.

mod config;

use std::collections::BTreeMap;

use accessible_bluff::{
    entities::PlayerId,
    table::{LogObserver, TableActor, TableEvent},
};
use anyhow::{Error, bail};
use config::SimConfig;
use ctrlc::set_handler;
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Play Bluff games between bots and narrate them

USAGE:
  ab_bots [OPTIONS]

OPTIONS:
  --bots        N          Bots per table               [default: env BLUFF_BOT_COUNT or 4]
  --difficulty  LEVEL      beginner|intermediate|advanced [default: env BLUFF_DIFFICULTY or intermediate]
  --games       N          Games to play back to back   [default: env BLUFF_GAMES or 1]
  --seed        N          Base seed for decks and bots [default: env BLUFF_SEED or random]

FLAGS:
  --fast                   Bots act without thinking delays
  -h, --help               Print help information

ENVIRONMENT:
  BLUFF_JOKERS             Jokers per deck (0-4)
  BLUFF_CHALLENGE_WINDOW_MS
                           How long a placement can be challenged
  RUST_LOG                 Log level (e.g., info, debug)
  (Variables may also be set in a .env file)
";

/// Capacity of the runner's event subscription.
const EVENT_BUFFER: usize = 16_384;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let mut config = SimConfig::from_env()?;
    if let Some(bots) = pargs.opt_value_from_str("--bots")? {
        config.bot_count = bots;
    }
    if let Some(difficulty) = pargs.opt_value_from_str("--difficulty")? {
        config.difficulty = difficulty;
    }
    if let Some(games) = pargs.opt_value_from_str("--games")? {
        config.games = games;
    }
    if let Some(seed) = pargs.opt_value_from_str("--seed")? {
        config.seed = Some(seed);
    }
    if pargs.contains("--fast") {
        config.fast = true;
    }
    let leftover = pargs.finish();
    if !leftover.is_empty() {
        bail!("Unexpected arguments: {leftover:?}");
    }
    config.validate()?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!(
        "Playing {} game(s) with {} {} bot(s)",
        config.games, config.bot_count, config.difficulty
    );

    let mut wins: BTreeMap<PlayerId, usize> = BTreeMap::new();
    for n in 0..config.games {
        let winner = play_game(&config, n).await?;
        *wins.entry(winner).or_default() += 1;
    }

    info!("Results after {} game(s):", config.games);
    for (bot, count) in &wins {
        info!("  - {bot}: {count} win(s)");
    }

    Ok(())
}

/// Run one all-bot game to completion and return the winner.
async fn play_game(config: &SimConfig, n: usize) -> Result<PlayerId, Error> {
    let (actor, handle) = TableActor::new(
        config.table_config(n),
        &[],
        Box::new(LogObserver::default()),
    )?;
    tokio::spawn(actor.run());

    let (_, mut events) = handle.subscribe(EVENT_BUFFER).await?;
    let response = handle.start().await?;
    if let Some(message) = response.error_message() {
        bail!("Game {} failed to start: {message}", n + 1);
    }

    let mut bot_actions = 0usize;
    let winner = loop {
        match events.recv().await {
            Some(TableEvent::BotAction { .. }) => bot_actions += 1,
            Some(TableEvent::GameOver { winner, lines }) => {
                for (bot, line) in lines {
                    info!("{bot}: \"{line}\"");
                }
                break winner;
            }
            Some(TableEvent::StateChanged { .. }) => {}
            None => bail!("Table closed before game {} finished", n + 1),
        }
    };

    info!(
        "Game {} won by {} after {} bot action(s)",
        n + 1,
        winner,
        bot_actions
    );
    if let Err(e) = handle.close().await {
        warn!("Table for game {} did not close cleanly: {}", n + 1, e);
    }
    Ok(winner)
}
