//! Cancellable scheduled events for the table actor.
//!
//! Deadlines are tokio [`Instant`]s, so tests running on a paused runtime
//! drive the queue with virtual time.

use std::collections::{BTreeMap, HashMap};
use tokio::time::{Duration, Instant};

use crate::bot::DecisionTicket;

#[derive(Clone, Debug, PartialEq)]
pub enum TimerKind {
    /// A bot's thinking time is up
    BotDecision(DecisionTicket),
    /// The challenge window opened by placement `seq` closes
    ChallengeWindow(u64),
}

/// Handle for cancelling one scheduled timer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerToken(u64);

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_token: u64,
    entries: BTreeMap<(Instant, u64), TimerKind>,
    deadlines: HashMap<u64, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Instant, kind: TimerKind) -> TimerToken {
        let token = self.next_token;
        self.next_token += 1;
        self.entries.insert((at, token), kind);
        self.deadlines.insert(token, at);
        TimerToken(token)
    }

    pub fn schedule_after(&mut self, delay: Duration, kind: TimerKind) -> TimerToken {
        self.schedule(Instant::now() + delay, kind)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        match self.deadlines.remove(&token.0) {
            Some(at) => self.entries.remove(&(at, token.0)).is_some(),
            None => false,
        }
    }

    /// Cancel every timer matching `pred`. Returns how many were cancelled.
    pub fn cancel_where(&mut self, pred: impl Fn(&TimerKind) -> bool) -> usize {
        let doomed: Vec<(Instant, u64)> = self
            .entries
            .iter()
            .filter(|(_, kind)| pred(kind))
            .map(|(key, _)| *key)
            .collect();
        for key in &doomed {
            self.entries.remove(key);
            self.deadlines.remove(&key.1);
        }
        doomed.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        self.deadlines.clear();
        n
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest timer due at `now`. Timers with the
    /// same deadline fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerKind> {
        let (&(at, token), _) = self.entries.first_key_value()?;
        if at > now {
            return None;
        }
        self.deadlines.remove(&token);
        self.entries.remove(&(at, token))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
