//! Narration collaborators.
//!
//! The table never talks to a presentation or speech layer directly. It
//! calls whatever [`GameObserver`] it was given, once per event, from the
//! actor task.

use log::info;

use crate::game::entities::{
    GameStage, GameView, PlayerId, PublicAction, PublicActionKind, value_label,
};

pub trait GameObserver: Send {
    fn on_state_changed(&mut self, view: &GameView);

    fn on_bot_action(
        &mut self,
        view: &GameView,
        bot: &PlayerId,
        action: &PublicAction,
        flavor: Option<&str>,
    );

    fn on_game_over(&mut self, view: &GameView, winner: &PlayerId, lines: &[(PlayerId, &str)]);
}

/// Ignores everything.
#[derive(Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {
    fn on_state_changed(&mut self, _view: &GameView) {}

    fn on_bot_action(
        &mut self,
        _view: &GameView,
        _bot: &PlayerId,
        _action: &PublicAction,
        _flavor: Option<&str>,
    ) {
    }

    fn on_game_over(&mut self, _view: &GameView, _winner: &PlayerId, _lines: &[(PlayerId, &str)]) {
    }
}

/// Narrates to the `log` facade at info level.
#[derive(Debug, Default)]
pub struct LogObserver {
    last_version: u64,
}

impl GameObserver for LogObserver {
    fn on_state_changed(&mut self, view: &GameView) {
        if view.version <= self.last_version {
            return;
        }
        self.last_version = view.version;
        if view.stage == GameStage::Playing
            && let Some(current) = &view.current_player
        {
            info!(
                "{}'s turn. Pile: {} card(s){}",
                display_name(view, current),
                view.pile_size,
                view.open_claim
                    .map(|v| format!(", claimed {}", value_label(v)))
                    .unwrap_or_default()
            );
        }
    }

    fn on_bot_action(
        &mut self,
        view: &GameView,
        bot: &PlayerId,
        action: &PublicAction,
        flavor: Option<&str>,
    ) {
        if let Some(line) = flavor {
            info!("{}: \"{line}\"", display_name(view, bot));
        }
        info!("{}", describe_action(view, action));
    }

    fn on_game_over(&mut self, view: &GameView, winner: &PlayerId, lines: &[(PlayerId, &str)]) {
        info!("{} wins the game!", display_name(view, winner));
        for (bot, line) in lines {
            info!("{}: \"{line}\"", display_name(view, bot));
        }
    }
}

pub fn display_name<'a>(view: &'a GameView, id: &'a PlayerId) -> &'a str {
    view.player(id).map_or(id.as_str(), |p| p.name.as_str())
}

/// One announcement sentence for an applied action, using display names.
/// Placed cards are never described; revealed cards are.
pub fn describe_action(view: &GameView, action: &PublicAction) -> String {
    let actor = display_name(view, &action.player);
    match &action.kind {
        PublicActionKind::Place {
            card_count,
            declared,
        } => {
            let noun = if *card_count == 1 { "card" } else { "cards" };
            format!(
                "{actor} places {card_count} {noun}, claiming {}",
                value_label(*declared)
            )
        }
        PublicActionKind::Challenge { outcome } => {
            let revealed: Vec<String> = outcome
                .revealed
                .iter()
                .map(|c| c.to_string().trim().to_string())
                .collect();
            let verdict = if outcome.was_successful {
                "It was a bluff!"
            } else {
                "The claim was true."
            };
            format!(
                "{actor} challenges {}. Revealed: {}. {verdict} {} picks up {} cards.",
                display_name(view, &outcome.target),
                revealed.join(", "),
                display_name(view, &outcome.receiver),
                outcome.pile_size
            )
        }
        PublicActionKind::Pass => format!("{actor} passes"),
    }
}
