use accessible_bluff::{
    GameEngine, GameSettings,
    bot::{BotAgent, BotConfig, BotDifficulty, BotOrchestrator, apply_bot_action},
    entities::{Action, PlayerId},
    game::Deck,
    table::create_game,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};

/// Helper to create a dealt game with N human seats
fn setup_game_with_players(n_players: usize) -> GameEngine {
    let mut game = GameEngine::new(GameSettings::default());
    for i in 0..n_players {
        game.add_player(
            PlayerId::new(&format!("player{i}")),
            &format!("Player {i}"),
            false,
        )
        .unwrap();
    }
    game.start(&mut StdRng::seed_from_u64(n_players as u64))
        .unwrap();
    game
}

/// Benchmark building and shuffling a deck
fn bench_shuffle(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    c.bench_function("deck_shuffle_54", |b| {
        b.iter(|| {
            let mut deck = Deck::new(2);
            deck.shuffle(&mut rng);
            deck
        });
    });
}

/// Benchmark dealing with different player counts
fn bench_deal(c: &mut Criterion) {
    let mut group = c.benchmark_group("deal");

    for n_players in [2, 4, 6, 10].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_players}_players")),
            n_players,
            |b, &n| {
                b.iter(|| Deck::new(2).deal(n));
            },
        );
    }

    group.finish();
}

/// Benchmark view generation with different player counts
fn bench_view_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_generation");

    for n_players in [2, 4, 6, 8, 10].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_players}_players")),
            n_players,
            |b, &n| {
                let game = setup_game_with_players(n);
                let me = PlayerId::new("player0");
                b.iter(|| game.view_for(Some(&me)));
            },
        );
    }

    group.finish();
}

/// Benchmark a placement followed by a challenge
fn bench_place_and_challenge(c: &mut Criterion) {
    c.bench_function("place_and_challenge", |b| {
        b.iter_batched(
            || setup_game_with_players(4),
            |mut game| {
                let placer = PlayerId::new("player0");
                let card = game.state().players[0].hand[0];
                game.submit_action(
                    &placer,
                    Action::Place {
                        cards: vec![card],
                        declared: 7,
                    },
                )
                .unwrap();
                game.submit_action(&PlayerId::new("player2"), Action::Challenge)
                    .unwrap();
                game
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark a single bot decision per difficulty
fn bench_bot_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("bot_decision");

    for difficulty in [
        BotDifficulty::Beginner,
        BotDifficulty::Intermediate,
        BotDifficulty::Advanced,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &difficulty,
            |b, &difficulty| {
                let game = setup_game_with_players(4);
                let config = BotConfig {
                    id: PlayerId::new("player0"),
                    name: "Bench".to_string(),
                    difficulty,
                    seed: Some(3),
                };
                let mut bot = BotAgent::new(config);
                let view = game.view_for(Some(bot.id()));
                b.iter(|| bot.decide(&view));
            },
        );
    }

    group.finish();
}

/// Benchmark a whole all-bot game
fn bench_full_bot_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_bot_game");
    group.sample_size(20);

    for n_bots in [2, 4, 6].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_bots}_bots")),
            n_bots,
            |b, &n| {
                let mut seed = 0;
                b.iter(|| {
                    seed += 1;
                    let mut rng = StdRng::seed_from_u64(seed);
                    let mut setup = create_game(
                        &[],
                        n,
                        BotDifficulty::Advanced,
                        GameSettings::default(),
                        Some(seed),
                        &mut rng,
                    )
                    .unwrap();
                    play_out(&mut setup.engine, &mut setup.bots)
                });
            },
        );
    }

    group.finish();
}

fn play_out(engine: &mut GameEngine, bots: &mut BotOrchestrator) -> u64 {
    while !engine.is_finished() {
        let Some(ticket) = bots.request_decision(engine) else {
            break;
        };
        let Some(decision) = bots.decide(&ticket, engine) else {
            continue;
        };
        let Ok(moved) = apply_bot_action(engine, &ticket.bot_id, decision.action) else {
            break;
        };
        let Some(record) = moved.record().cloned() else {
            continue;
        };
        bots.mirror_state(engine, &record);
    }
    engine.state().action_seq
}

criterion_group!(deck_operations, bench_shuffle, bench_deal);

criterion_group!(
    game_operations,
    bench_view_generation,
    bench_place_and_challenge,
);

criterion_group!(bot_operations, bench_bot_decision, bench_full_bot_game);

criterion_main!(deck_operations, game_operations, bot_operations);
