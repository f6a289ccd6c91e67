//! Query DTOs - pagination cursors

use serde::{Deserialize, Serialize};

/// Message pagination: `before_id` is the last-seen message id from the
/// previous page. Timestamps are deliberately not a cursor option, ids
/// are the only collision-free order under concurrent senders.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MessagesQuery {
    #[serde(default)]
    pub before_id: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}
