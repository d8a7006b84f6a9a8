//! Table actor tests on a paused tokio clock.
//!
//! With time paused the runtime jumps straight to the next timer whenever
//! every task is idle, so bot thinking delays and challenge windows play out
//! instantly but in the same order they would in real time.

use accessible_bluff::{
    bot::BotDifficulty,
    game::{
        ActionError,
        entities::{Action, GameStage, PlayerId},
    },
    table::{
        LogObserver, NullObserver, TableActor, TableConfig, TableError, TableEvent, TableHandle,
        TableResponse, TableSpeed,
    },
};
use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};

/// Virtual time budget for a whole game.
const DAY: Duration = Duration::from_secs(24 * 3600);

fn humans(names: &[&str]) -> Vec<(PlayerId, String)> {
    names
        .iter()
        .map(|n| (PlayerId::new(&n.to_lowercase()), n.to_string()))
        .collect()
}

fn spawn_table(config: TableConfig, humans: &[(PlayerId, String)]) -> TableHandle {
    let (actor, handle) = TableActor::new(config, humans, Box::new(NullObserver)).unwrap();
    tokio::spawn(actor.run());
    handle
}

fn bot_table(bots: usize, difficulty: BotDifficulty, seed: u64) -> TableConfig {
    TableConfig {
        bot_count: bots,
        bot_difficulty: difficulty,
        seed: Some(seed),
        ..TableConfig::default()
    }
}

/// Read events until the game ends, checking that no broadcast view ever
/// carries a hand.
async fn until_game_over(events: &mut mpsc::Receiver<TableEvent>) -> (PlayerId, usize) {
    let mut bot_actions = 0;
    loop {
        match events.recv().await.expect("table dropped the subscriber") {
            TableEvent::StateChanged { view } => {
                assert!(view.hand.is_empty(), "broadcast view leaked a hand");
                assert!(view.perspective.is_none());
            }
            TableEvent::BotAction { action, .. } => {
                bot_actions += 1;
                assert!(action.seq > 0);
            }
            TableEvent::GameOver { winner, .. } => return (winner, bot_actions),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_bot_game_runs_to_completion() {
    let handle = spawn_table(bot_table(4, BotDifficulty::Intermediate, 11), &[]);
    let (_, mut events) = handle.subscribe(10_000).await.unwrap();
    assert_eq!(handle.start().await.unwrap(), TableResponse::Success);

    let (winner, bot_actions) = timeout(DAY, until_game_over(&mut events))
        .await
        .expect("game did not finish");
    assert!(bot_actions > 0);

    let view = handle.view(None).await.unwrap();
    assert_eq!(view.stage, GameStage::Finished);
    assert_eq!(view.winner, Some(winner.clone()));
    assert_eq!(view.card_count_of(&winner), 0);
}

#[tokio::test(start_paused = true)]
async fn test_each_difficulty_finishes_a_game() {
    for (seed, difficulty) in [
        BotDifficulty::Beginner,
        BotDifficulty::Intermediate,
        BotDifficulty::Advanced,
    ]
    .into_iter()
    .enumerate()
    {
        let config = TableConfig {
            speed: TableSpeed::Turbo,
            ..bot_table(3, difficulty, seed as u64)
        };
        let (actor, handle) =
            TableActor::new(config, &[], Box::new(LogObserver::default())).unwrap();
        tokio::spawn(actor.run());
        let (_, mut events) = handle.subscribe(10_000).await.unwrap();
        handle.start().await.unwrap();

        timeout(DAY, until_game_over(&mut events))
            .await
            .unwrap_or_else(|_| panic!("{difficulty} game did not finish"));
        handle.close().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_finished_game_goes_quiet() {
    let handle = spawn_table(bot_table(3, BotDifficulty::Beginner, 5), &[]);
    let (_, mut events) = handle.subscribe(10_000).await.unwrap();
    handle.start().await.unwrap();
    until_game_over(&mut events).await;

    let before = handle.view(None).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3600)).await;
    let after = handle.view(None).await.unwrap();
    assert_eq!(before.version, after.version, "no timer fired after the win");
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_human_actions_validated() {
    let config = TableConfig {
        challenge_window_ms: 100,
        ..bot_table(1, BotDifficulty::Intermediate, 21)
    };
    let handle = spawn_table(config, &humans(&["Ana"]));
    let ana = PlayerId::new("ana");

    let early = handle.submit_action(ana.clone(), Action::Pass).await.unwrap();
    assert_eq!(early, TableResponse::Rejected(ActionError::GameNotInProgress));
    handle.start().await.unwrap();

    let view = handle.view(Some(ana.clone())).await.unwrap();
    assert!(view.is_turn_of(&ana));
    assert_eq!(view.hand.len(), view.card_count_of(&ana));

    let bot = PlayerId::bot(1);
    let response = handle.submit_action(bot, Action::Pass).await.unwrap();
    assert!(matches!(response, TableResponse::Error(_)), "bots are played by the table");

    let card = view.hand[0];
    let response = handle
        .submit_action(
            ana.clone(),
            Action::Place {
                cards: vec![card],
                declared: 3,
            },
        )
        .await
        .unwrap();
    let TableResponse::Applied(public) = response else {
        panic!("placement rejected: {response:?}");
    };
    assert_eq!(public.placement(), Some((1, 3)));

    // Replaying the same cards is now illegal.
    let again = handle
        .submit_action(
            ana.clone(),
            Action::Place {
                cards: vec![card],
                declared: 3,
            },
        )
        .await
        .unwrap();
    assert!(matches!(again, TableResponse::Rejected(_)));
}

#[tokio::test(start_paused = true)]
async fn test_challenge_window_closes_on_its_own() {
    // Bots think for at least half a second, well past the window.
    let config = TableConfig {
        challenge_window_ms: 100,
        ..bot_table(1, BotDifficulty::Beginner, 8)
    };
    let handle = spawn_table(config, &humans(&["Ana"]));
    let ana = PlayerId::new("ana");
    handle.start().await.unwrap();

    let card = handle.view(Some(ana.clone())).await.unwrap().hand[0];
    handle
        .submit_action(
            ana.clone(),
            Action::Place {
                cards: vec![card],
                declared: 5,
            },
        )
        .await
        .unwrap();
    let open = handle.view(None).await.unwrap();
    assert!(open.challenge_open);
    assert_eq!(open.open_claim, Some(5));

    tokio::time::sleep(Duration::from_millis(150)).await;
    let closed = handle.view(None).await.unwrap();
    assert!(!closed.challenge_open);
    assert!(closed.pending_claim().is_none());
    assert_eq!(closed.action_seq, open.action_seq, "no bot acted yet");
}

#[tokio::test(start_paused = true)]
async fn test_humans_challenge_each_other() {
    let config = TableConfig {
        bot_count: 0,
        seed: Some(4),
        ..TableConfig::default()
    };
    let handle = spawn_table(config, &humans(&["Ana", "Ben", "Cal"]));
    let ana = PlayerId::new("ana");
    let ben = PlayerId::new("ben");
    let cal = PlayerId::new("cal");
    handle.start().await.unwrap();

    let hand = handle.view(Some(ana.clone())).await.unwrap().hand;
    let card = *hand.iter().find(|c| !c.is_joker()).unwrap();
    let lie = card.value % 13 + 1;
    handle
        .submit_action(
            ana.clone(),
            Action::Place {
                cards: vec![card],
                declared: lie,
            },
        )
        .await
        .unwrap();

    let response = handle.submit_action(cal.clone(), Action::Challenge).await.unwrap();
    let TableResponse::Applied(public) = response else {
        panic!("challenge rejected: {response:?}");
    };
    let outcome = public.challenge_outcome().unwrap();
    assert!(outcome.was_successful);
    assert_eq!(outcome.receiver, ana);
    assert_eq!(outcome.revealed, vec![card]);

    let late = handle.submit_action(ben, Action::Challenge).await.unwrap();
    assert_eq!(late, TableResponse::Rejected(ActionError::NoPendingClaim));

    let view = handle.view(None).await.unwrap();
    assert_eq!(view.current_player, Some(ana));
    assert_eq!(view.pile_size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_inactive_bot_loses_its_turn() {
    let handle = spawn_table(bot_table(2, BotDifficulty::Advanced, 13), &humans(&["Ana"]));
    let ana = PlayerId::new("ana");
    handle.start().await.unwrap();

    let response = handle
        .set_player_activity(PlayerId::bot(1), false, false, false)
        .await
        .unwrap();
    assert_eq!(response, TableResponse::Success);

    let card = handle.view(Some(ana.clone())).await.unwrap().hand[0];
    handle
        .submit_action(
            ana,
            Action::Place {
                cards: vec![card],
                declared: 12,
            },
        )
        .await
        .unwrap();
    let view = handle.view(None).await.unwrap();
    assert_eq!(view.current_player, Some(PlayerId::bot(2)));

    let unknown = handle
        .set_player_activity(PlayerId::new("ghost"), true, false, false)
        .await
        .unwrap();
    assert!(matches!(
        unknown,
        TableResponse::Rejected(ActionError::UnknownPlayer(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_new_game_discards_pending_decisions() {
    let handle = spawn_table(bot_table(3, BotDifficulty::Intermediate, 17), &[]);
    handle.start().await.unwrap();
    let first = handle.view(None).await.unwrap();

    // The first bot is still thinking when the table is re-dealt.
    assert_eq!(handle.new_game().await.unwrap(), TableResponse::Success);
    let (_, mut events) = handle.subscribe(10_000).await.unwrap();
    let second = handle.view(None).await.unwrap();
    assert_ne!(first.game_id, second.game_id);
    assert_eq!(second.action_seq, 0);

    let game_id = second.game_id;
    loop {
        match events.recv().await.unwrap() {
            TableEvent::StateChanged { view } => assert_eq!(view.game_id, game_id),
            TableEvent::BotAction { action, .. } => {
                assert!(action.seq >= 1);
            }
            TableEvent::GameOver { .. } => break,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_fails() {
    let handle = spawn_table(bot_table(2, BotDifficulty::Beginner, 1), &[]);
    assert!(handle.start().await.unwrap().is_success());
    let again = handle.start().await.unwrap();
    assert!(matches!(again, TableResponse::SetupFailed(_)));
    assert!(again.error_message().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_closed_table_stops_answering() {
    let handle = spawn_table(bot_table(2, BotDifficulty::Beginner, 2), &[]);
    handle.start().await.unwrap();
    assert_eq!(handle.close().await.unwrap(), TableResponse::Success);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(handle.view(None).await, Err(TableError::Closed)));
}

#[test]
fn test_invalid_config_rejected() {
    let config = TableConfig {
        challenge_window_ms: 0,
        ..TableConfig::default()
    };
    let result = TableActor::new(config, &[], Box::new(NullObserver));
    assert!(matches!(result, Err(TableError::InvalidConfig(_))));

    let lonely = TableConfig {
        bot_count: 1,
        ..TableConfig::default()
    };
    let result = TableActor::new(lonely, &[], Box::new(NullObserver));
    assert!(matches!(result, Err(TableError::Setup(_))));
}
