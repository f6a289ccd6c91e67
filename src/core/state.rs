//! Application State - shared core state
//!
//! Holds the repositories, the ephemeral typing map, the event channel
//! and the configuration. Transports construct one of these and pass it
//! to every service call.

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::core::typing::TypingMap;
use crate::events::{CoreEvent, EVENT_CHANNEL_CAPACITY};
use crate::repositories::{
    ChatRepository, MembershipRepository, MessageReadRepository, MessageRepository, UserRepository,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::broadcast;
use tracing::info;

pub struct AppState {
    /// Read-only identity view
    pub user: UserRepository,

    /// Conversation store
    pub chat: ChatRepository,

    /// Membership ledger
    pub member: MembershipRepository,

    /// Message log
    pub msg: MessageRepository,

    /// Read receipts
    pub reads: MessageReadRepository,

    /// Ephemeral typing indicators, never persisted
    pub typing: TypingMap,

    /// Hook point for external notification dispatch
    pub events: broadcast::Sender<CoreEvent>,

    pub config: Config,
}

impl AppState {
    /// Build the state over an already-connected pool (the test suites
    /// inject their own).
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            user: UserRepository::new(pool.clone()),
            chat: ChatRepository::new(pool.clone()),
            member: MembershipRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            reads: MessageReadRepository::new(pool),
            typing: TypingMap::new(),
            events,
            config,
        }
    }

    /// Connect to the configured database, run migrations and build the
    /// state.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::unavailable("Migration failed").with_details(e.to_string()))?;

        info!("Database connected and migrated");
        Ok(Self::new(pool, config))
    }

    /// Subscribe to membership-change and message-append events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }
}
