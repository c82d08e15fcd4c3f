use chrono::{TimeZone, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::Unavailable;

/// Expiry for a paste created at `now` with `ttl_seconds`, if it fits in a UTC timestamp.
pub fn expiry_for(now: i64, ttl_seconds: i64) -> Option<i64> {
    let expires_at = ttl_seconds.checked_mul(1000)?.checked_add(now)?;
    Utc.timestamp_millis_opt(expires_at).single()?;
    Some(expires_at)
}

/// A stored paste. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub max_views: Option<i64>,
    pub views: i64,
}

impl Paste {
    pub fn new(
        id: String,
        content: String,
        now: i64,
        ttl_seconds: Option<i64>,
        max_views: Option<i64>,
    ) -> Self {
        Paste {
            id,
            content,
            created_at: now,
            expires_at: ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000))),
            max_views,
            views: 0,
        }
    }

    /// Whether this paste may be served at `now`, checking expiry before the view limit.
    pub fn check_available(&self, now: i64) -> Result<(), Unavailable> {
        if self.expires_at.is_some_and(|expires_at| now >= expires_at) {
            return Err(Unavailable::Expired);
        }
        if self.max_views.is_some_and(|max_views| self.views >= max_views) {
            return Err(Unavailable::Exhausted);
        }
        Ok(())
    }

    pub fn remaining_views(&self) -> Option<i64> {
        self.max_views.map(|max_views| (max_views - self.views).max(0))
    }
}
