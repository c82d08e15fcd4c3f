use tracing::{debug, error, info, warn};

use crate::error::{ApiError, Invalid};
use crate::keys::generate_key;
use crate::models::{expiry_for, Paste};
use crate::storage::{AnyStorage, Storage};

/// Fresh ids to try before giving up on a create.
const MAX_KEY_ATTEMPTS: usize = 8;

/// Validated-on-create input for a new paste.
#[derive(Debug, Clone, Default)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}

/// What a successful fetch hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPaste {
    pub content: String,
    pub remaining_views: Option<i64>,
    pub expires_at: Option<i64>,
}

impl From<Paste> for FetchedPaste {
    fn from(paste: Paste) -> Self {
        FetchedPaste {
            remaining_views: paste.remaining_views(),
            expires_at: paste.expires_at,
            content: paste.content,
        }
    }
}

/// Check create input for a paste made at `now`. The expiry must be a representable timestamp.
pub fn validate(new: &NewPaste, now: i64) -> Result<(), Invalid> {
    if new.content.trim().is_empty() {
        return Err(Invalid::Content);
    }
    if let Some(ttl) = new.ttl_seconds {
        if ttl < 1 || expiry_for(now, ttl).is_none() {
            return Err(Invalid::TtlSeconds);
        }
    }
    if new.max_views.is_some_and(|max_views| max_views < 1) {
        return Err(Invalid::MaxViews);
    }
    Ok(())
}

/// Store a new paste created at `now`.
pub async fn create(storage: &AnyStorage, new: NewPaste, now: i64) -> crate::ApiResult<Paste> {
    validate(&new, now)?;

    let mut paste = Paste::new(
        generate_key(),
        new.content,
        now,
        new.ttl_seconds,
        new.max_views,
    );

    for _ in 0..MAX_KEY_ATTEMPTS {
        if storage.put_paste(&paste).await? {
            info!(
                "new paste: id='{id}', size={size}, ttl={ttl:?}, max_views={max_views:?}",
                id = paste.id,
                size = paste.content.len(),
                ttl = new.ttl_seconds,
                max_views = paste.max_views,
            );
            return Ok(paste);
        }
        warn!("paste id '{}' already taken, generating another", paste.id);
        paste.id = generate_key();
    }

    Err(ApiError::KeySpaceExhausted {
        attempts: MAX_KEY_ATTEMPTS,
    })
}

/// Serve a paste at `now`, counting the view.
pub async fn fetch(storage: &AnyStorage, id: &str, now: i64) -> crate::ApiResult<FetchedPaste> {
    let paste = storage.consume_paste(id, now).await?;
    debug!("served paste '{id}', views={}", paste.views);
    Ok(paste.into())
}

pub async fn health(storage: &AnyStorage) -> bool {
    match storage.ping().await {
        Ok(()) => true,
        Err(err) => {
            error!("storage health check failed: {err:?}");
            false
        }
    }
}
