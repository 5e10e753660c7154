use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreatePaste {
    pub content: String,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}

#[derive(Serialize)]
pub struct PasteCreated {
    pub id: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct PasteBody {
    pub content: String,
    pub remaining_views: Option<u64>,
    /// ISO-8601 timestamp, or null for pastes without a TTL.
    pub expires_at: Option<DateTime<Utc>>,
}
