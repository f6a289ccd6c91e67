//! TypingMap - ephemeral typing indicators
//!
//! Advisory (chat, user) -> started_at entries with no durability
//! guarantee. Upserts are last-writer-wins, expiry is a read-time filter
//! against the TTL; there is no reaper task.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, instrument};

pub struct TypingMap {
    started: DashMap<(i64, i64), DateTime<Utc>>,
}

impl TypingMap {
    pub fn new() -> Self {
        TypingMap {
            started: DashMap::new(),
        }
    }

    /// Upsert the indicator with a fresh timestamp. Calling twice just
    /// refreshes the window.
    #[instrument(skip(self))]
    pub fn start(&self, chat_id: i64, user_id: i64, started_at: DateTime<Utc>) {
        debug!("Upserting typing indicator");
        self.started.insert((chat_id, user_id), started_at);
    }

    /// Remove the indicator; removing a missing one is a no-op.
    #[instrument(skip(self))]
    pub fn stop(&self, chat_id: i64, user_id: i64) {
        self.started.remove(&(chat_id, user_id));
    }

    /// Users whose indicator for `chat_id` is still inside the TTL window
    /// at `as_of`. Expired entries for the chat are dropped on the way.
    #[instrument(skip(self))]
    pub fn active_typers(&self, chat_id: i64, as_of: DateTime<Utc>, ttl: Duration) -> Vec<i64> {
        self.started
            .retain(|&(chat, _), &mut started| chat != chat_id || as_of - started < ttl);

        let mut typers: Vec<i64> = self
            .started
            .iter()
            .filter(|entry| entry.key().0 == chat_id)
            .map(|entry| entry.key().1)
            .collect();
        typers.sort_unstable();

        debug!(count = typers.len(), "Collected active typers");
        typers
    }
}

impl Default for TypingMap {
    fn default() -> Self {
        Self::new()
    }
}
