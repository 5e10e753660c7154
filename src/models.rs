use chrono::{DateTime, Utc};

/// A stored paste. The id is the store's map key and is not duplicated here.
#[derive(Debug, Clone)]
pub struct Paste {
    pub content: String,
    /// Absolute expiry instant; `None` means no time limit. Set once at
    /// creation, never recomputed.
    pub expires_at: Option<DateTime<Utc>>,
    /// View quota; `None` means unlimited.
    pub max_views: Option<u64>,
    /// Incremented exactly once per successful fetch.
    pub view_count: u64,
}

/// The result of one successful, counted fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPaste {
    pub content: String,
    pub remaining_views: Option<u64>,
    pub expires_at: Option<DateTime<Utc>>,
}
