use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::error::{ApiError, ApiResult};
use crate::ids::IdGenerator;
use crate::models::{FetchedPaste, Paste};

/// In-memory paste collection with time- and count-based expiry enforced at
/// read time. Cloning yields another handle to the same collection.
///
/// A single lock guards the whole map, so each `create` and `fetch` runs as
/// one indivisible unit. Expired records are removed lazily, by whichever
/// fetch discovers the violation; there is no background sweep.
#[derive(Clone)]
pub struct PasteStore {
    pastes: Arc<Mutex<HashMap<String, Paste>>>,
    ids: Arc<dyn IdGenerator>,
}

impl PasteStore {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        PasteStore {
            pastes: Arc::new(Mutex::new(HashMap::new())),
            ids,
        }
    }

    /// Store a new paste and return its id.
    ///
    /// `expires_at` is fixed here from `now + ttl_seconds` and never
    /// recomputed. The caller supplies `now` so that expiry is measured
    /// against the same clock used for `fetch`.
    pub fn create(
        &self,
        content: String,
        ttl_seconds: Option<i64>,
        max_views: Option<i64>,
        now: DateTime<Utc>,
    ) -> ApiResult<String> {
        if content.is_empty() {
            return Err(ApiError::EmptyContent);
        }

        let expires_at = match ttl_seconds {
            Some(secs) if secs >= 1 => {
                let ttl = Duration::try_seconds(secs).ok_or(ApiError::InvalidTtl)?;
                Some(now.checked_add_signed(ttl).ok_or(ApiError::InvalidTtl)?)
            }
            Some(_) => return Err(ApiError::InvalidTtl),
            None => None,
        };

        let max_views = match max_views {
            Some(views) if views >= 1 => Some(views as u64),
            Some(_) => return Err(ApiError::InvalidMaxViews),
            None => None,
        };

        let id = self.ids.generate();

        let mut pastes = self.lock();
        match pastes.entry(id.clone()) {
            // practically improbable with a high-entropy generator; abort
            // just this request
            Entry::Occupied(_) => Err(ApiError::IdCollision),
            Entry::Vacant(slot) => {
                slot.insert(Paste {
                    content,
                    expires_at,
                    max_views,
                    view_count: 0,
                });
                Ok(id)
            }
        }
    }

    /// Fetch a paste by id, counting the view.
    ///
    /// Expiry checks happen before the view is counted: a fetch at exactly
    /// `expires_at` still succeeds, and a paste created with `max_views = N`
    /// permits exactly N fetches. A fetch that finds either condition
    /// violated removes the record and reports it unavailable, same as an id
    /// that never existed.
    pub fn fetch(&self, id: &str, now: DateTime<Utc>) -> ApiResult<FetchedPaste> {
        let mut pastes = self.lock();

        let Entry::Occupied(mut entry) = pastes.entry(id.to_owned()) else {
            return Err(ApiError::NotFound);
        };

        if entry.get().expires_at.is_some_and(|at| now > at) {
            entry.remove();
            return Err(ApiError::NotFound);
        }

        let paste = entry.get();
        if paste.max_views.is_some_and(|max| paste.view_count >= max) {
            entry.remove();
            return Err(ApiError::NotFound);
        }

        let paste = entry.get_mut();
        paste.view_count += 1;

        Ok(FetchedPaste {
            content: paste.content.clone(),
            remaining_views: paste
                .max_views
                .map(|max| max.saturating_sub(paste.view_count)),
            expires_at: paste.expires_at,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Paste>> {
        self.pastes.lock().expect("paste store lock poisoned")
    }
}
