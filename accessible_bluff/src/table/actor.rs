//! Table actor implementation with async message handling.

use chrono::Utc;
use log::{debug, error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};
use uuid::Uuid;

use super::{
    config::TableConfig,
    messages::{SubscriberId, TableEvent, TableMessage, TableResponse},
    narrator::GameObserver,
    setup::{GameSetup, seat_players},
    timers::{TimerKind, TimerQueue},
};
use crate::{
    bot::{BotMove, BotOrchestrator, DecisionTicket, apply_bot_action},
    game::{
        GameEngine,
        entities::{Action, GameStage, GameView, PlayerId, Resolution, ResolvedAction},
        errors::SetupError,
    },
};

/// Inbox size of a table.
const INBOX_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid table config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("table is closed")]
    Closed,
}

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: Uuid,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: Uuid) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> Uuid {
        self.table_id
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), TableError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::Closed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, TableError> {
        let (response, rx) = oneshot::channel();
        self.send(message(response)).await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn start(&self) -> Result<TableResponse, TableError> {
        self.request(|response| TableMessage::Start { response })
            .await
    }

    pub async fn submit_action(
        &self,
        player: PlayerId,
        action: Action,
    ) -> Result<TableResponse, TableError> {
        self.request(|response| TableMessage::SubmitAction {
            player,
            action,
            response,
        })
        .await
    }

    pub async fn view(&self, player: Option<PlayerId>) -> Result<GameView, TableError> {
        self.request(|response| TableMessage::GetView { player, response })
            .await
    }

    pub async fn set_player_activity(
        &self,
        player: PlayerId,
        is_active: bool,
        is_blacklisted: bool,
        is_disconnected: bool,
    ) -> Result<TableResponse, TableError> {
        self.request(|response| TableMessage::SetPlayerActivity {
            player,
            is_active,
            is_blacklisted,
            is_disconnected,
            response,
        })
        .await
    }

    /// Subscribe to table events through a channel of `capacity`.
    pub async fn subscribe(
        &self,
        capacity: usize,
    ) -> Result<(SubscriberId, mpsc::Receiver<TableEvent>), TableError> {
        let (sender, events) = mpsc::channel(capacity);
        let id = self
            .request(|response| TableMessage::Subscribe { sender, response })
            .await?;
        Ok((id, events))
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> Result<(), TableError> {
        self.send(TableMessage::Unsubscribe { id }).await
    }

    pub async fn new_game(&self) -> Result<TableResponse, TableError> {
        self.request(|response| TableMessage::NewGame { response })
            .await
    }

    pub async fn close(&self) -> Result<TableResponse, TableError> {
        self.request(|response| TableMessage::Close { response })
            .await
    }
}

/// Table actor owning one game and the bots playing in it
pub struct TableActor {
    /// Table ID
    id: Uuid,

    /// Table configuration
    config: TableConfig,

    /// Authoritative game
    engine: GameEngine,

    /// Bots seated at the table
    bots: BotOrchestrator,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Bot thinking and challenge window deadlines
    timers: TimerQueue,

    /// Deck shuffling
    rng: StdRng,

    /// Narration collaborator
    observer: Box<dyn GameObserver>,

    /// Subscribers for table events
    subscribers: HashMap<SubscriberId, mpsc::Sender<TableEvent>>,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `config` - Table configuration
    /// * `humans` - Id and display name of every human player, in seat order
    /// * `observer` - Receives narration callbacks
    ///
    /// # Returns
    ///
    /// * `Result<(TableActor, TableHandle), TableError>` - Actor and handle for sending messages
    pub fn new(
        config: TableConfig,
        humans: &[(PlayerId, String)],
        observer: Box<dyn GameObserver>,
    ) -> Result<(Self, TableHandle), TableError> {
        config.validate().map_err(TableError::InvalidConfig)?;
        let GameSetup { engine, bots } = seat_players(
            humans,
            config.bot_count,
            config.bot_difficulty,
            config.game_settings(),
            config.seed,
        )?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let id = Uuid::new_v4();
        let actor = Self {
            id,
            config,
            engine,
            bots,
            inbox,
            timers: TimerQueue::new(),
            rng,
            observer,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        Ok((actor, TableHandle::new(sender, id)))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        info!("Table {} '{}' starting", self.id, self.config.name);

        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => break,
                    }
                    if self.is_closed {
                        break;
                    }
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_due_timers();
                }
            }
        }

        self.timers.cancel_all();
        self.bots.cancel_outstanding();
        info!("Table {} '{}' closed", self.id, self.config.name);
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Start { response } => {
                let result = self.handle_start();
                let _ = response.send(result);
            }

            TableMessage::SubmitAction {
                player,
                action,
                response,
            } => {
                let result = self.handle_action(&player, action);
                let _ = response.send(result);
            }

            TableMessage::GetView { player, response } => {
                let _ = response.send(self.engine.view_for(player.as_ref()));
            }

            TableMessage::SetPlayerActivity {
                player,
                is_active,
                is_blacklisted,
                is_disconnected,
                response,
            } => {
                let result = match self.engine.set_player_activity(
                    &player,
                    is_active,
                    is_blacklisted,
                    is_disconnected,
                ) {
                    Ok(()) => {
                        info!(
                            "Table {}: {} active={} blacklisted={} disconnected={}",
                            self.id, player, is_active, is_blacklisted, is_disconnected
                        );
                        self.state_changed();
                        self.reschedule_bots();
                        TableResponse::Success
                    }
                    Err(e) => TableResponse::Rejected(e),
                };
                let _ = response.send(result);
            }

            TableMessage::Subscribe { sender, response } => {
                let id = Uuid::new_v4();
                self.subscribers.insert(id, sender);
                debug!("Subscriber {} added to table {}", id, self.id);
                let _ = response.send(id);
            }

            TableMessage::Unsubscribe { id } => {
                self.subscribers.remove(&id);
                debug!("Subscriber {} removed from table {}", id, self.id);
            }

            TableMessage::NewGame { response } => {
                let result = self.handle_new_game();
                let _ = response.send(result);
            }

            TableMessage::Close { response } => {
                self.timers.cancel_all();
                self.bots.cancel_outstanding();
                self.is_closed = true;
                let _ = response.send(TableResponse::Success);
            }
        }
    }

    fn handle_start(&mut self) -> TableResponse {
        if self.engine.stage() != GameStage::Waiting {
            return TableResponse::SetupFailed(SetupError::AlreadyStarted);
        }
        match self.engine.start(&mut self.rng) {
            Ok(()) => {
                self.state_changed();
                self.reschedule_bots();
                TableResponse::Success
            }
            Err(e) => TableResponse::SetupFailed(e),
        }
    }

    fn handle_new_game(&mut self) -> TableResponse {
        self.timers.cancel_all();
        self.bots.reset_all();
        match self.engine.restart(&mut self.rng) {
            Ok(()) => {
                info!(
                    "Table {} dealt new game {}",
                    self.id,
                    self.engine.state().game_id
                );
                self.state_changed();
                self.reschedule_bots();
                TableResponse::Success
            }
            Err(e) => TableResponse::SetupFailed(e),
        }
    }

    /// Handle a human player's action
    fn handle_action(&mut self, player: &PlayerId, action: Action) -> TableResponse {
        if self.bots.is_bot(player) {
            return TableResponse::Error(format!("{player} is played by the table"));
        }
        match self.engine.submit_action(player, action) {
            Ok(record) => {
                let public = record.to_public();
                self.after_action(&record);
                TableResponse::Applied(public)
            }
            Err(e) => {
                debug!("Table {}: rejected action from {}: {}", self.id, player, e);
                TableResponse::Rejected(e)
            }
        }
    }

    /// Everything that follows an applied action: memories, narration,
    /// the challenge window, game over and the next bot decision.
    fn after_action(&mut self, record: &ResolvedAction) {
        self.bots.mirror_state(&self.engine, record);
        self.state_changed();

        if self.engine.is_finished() {
            self.finish_game();
            return;
        }

        if matches!(record.resolution, Resolution::Place { .. }) {
            self.timers.cancel_where(|k| matches!(k, TimerKind::ChallengeWindow(_)));
            self.timers.schedule_after(
                self.config.challenge_window(),
                TimerKind::ChallengeWindow(record.seq),
            );
        }
        self.reschedule_bots();
    }

    fn finish_game(&mut self) {
        self.timers.cancel_all();
        self.bots.cancel_outstanding();
        let Some(winner) = self.engine.state().winner.clone() else {
            error!("Table {}: game finished without a winner", self.id);
            return;
        };
        let lines = self.bots.announce_game_over(&winner);
        let view = self.engine.view_for(None);
        self.observer.on_game_over(&view, &winner, &lines);
        info!("Table {}: {} won game {}", self.id, winner, view.game_id);
        self.broadcast(TableEvent::GameOver { winner, lines });
    }

    /// Drop whatever decision is pending and ask again for the current
    /// state.
    fn reschedule_bots(&mut self) {
        if self.bots.cancel_outstanding().is_some() {
            self.timers
                .cancel_where(|k| matches!(k, TimerKind::BotDecision(_)));
        }
        self.schedule_bot_decision();
    }

    fn schedule_bot_decision(&mut self) {
        let Some(ticket) = self.bots.request_decision(&self.engine) else {
            return;
        };
        let delay = self.config.speed.pace(self.bots.think_delay(&ticket));
        debug!(
            "Table {}: {} thinking for {:?}",
            self.id, ticket.bot_id, delay
        );
        self.timers
            .schedule_after(delay, TimerKind::BotDecision(ticket));
    }

    fn fire_due_timers(&mut self) {
        let now = Instant::now();
        // Timers scheduled while handling these wait for the next loop turn,
        // so the inbox is never starved.
        let due: Vec<TimerKind> = std::iter::from_fn(|| self.timers.pop_due(now)).collect();
        for kind in due {
            match kind {
                TimerKind::BotDecision(ticket) => self.run_bot_decision(ticket),
                TimerKind::ChallengeWindow(seq) => {
                    if self.engine.close_challenge_window(seq) {
                        self.state_changed();
                    }
                }
            }
        }
    }

    fn run_bot_decision(&mut self, ticket: DecisionTicket) {
        let Some(decision) = self.bots.decide(&ticket, &self.engine) else {
            self.schedule_bot_decision();
            return;
        };
        let bot = ticket.bot_id;

        let record = match apply_bot_action(&mut self.engine, &bot, decision.action) {
            Ok(BotMove::Applied(record)) => record,
            Ok(BotMove::Passed { record, rejected }) => {
                warn!(
                    "Table {}: {} made a rejected move ({}), passing instead",
                    self.id, bot, rejected
                );
                record
            }
            Ok(BotMove::Dropped(rejected)) => {
                warn!("Table {}: {} made a rejected move: {}", self.id, bot, rejected);
                self.schedule_bot_decision();
                return;
            }
            Err(e) => {
                error!("Table {}: {} could not pass: {}", self.id, bot, e);
                return;
            }
        };

        let public = record.to_public();
        let view = self.engine.view_for(None);
        self.observer
            .on_bot_action(&view, &bot, &public, decision.flavor);
        self.broadcast(TableEvent::BotAction {
            bot,
            action: public,
            flavor: decision.flavor,
            at: Utc::now(),
        });
        self.after_action(&record);
    }

    fn state_changed(&mut self) {
        let view = self.engine.view_for(None);
        self.observer.on_state_changed(&view);
        self.broadcast(TableEvent::StateChanged { view });
    }

    /// Send an event to all subscribers
    fn broadcast(&mut self, event: TableEvent) {
        self.subscribers.retain(|id, sender| {
            match sender.try_send(event.clone()) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("Subscriber {} channel full, dropping event", id);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("Subscriber {} disconnected, removing", id);
                    false
                }
            }
        });
    }
}
