use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::warn;

use super::Storage;
use crate::error::Unavailable;
use crate::models::Paste;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS pastes (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    expires_at INTEGER,
    max_views INTEGER,
    views INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
)";

#[derive(Clone)]
pub struct SqlStorage {
    pool: AnyPool,
}

impl SqlStorage {
    /// Connect to a database by URL and make sure the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: AnyPool) -> anyhow::Result<Self> {
        let mut conn = pool.acquire().await?;
        sqlx::query(SCHEMA).execute(&mut conn).await?;
        drop(conn);
        Ok(Self { pool })
    }

    async fn get_paste(&self, id: &str) -> crate::ApiResult<Option<Paste>> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at, expires_at, max_views, views FROM pastes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut conn)
        .await?;
        Ok(paste)
    }
}

impl Storage for SqlStorage {
    async fn put_paste(&self, paste: &Paste) -> crate::ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            "INSERT INTO pastes (id, content, created_at, expires_at, max_views, views) VALUES \
             (?, ?, ?, ?, ?, ?) ON CONFLICT (id) DO NOTHING",
        )
        .bind(paste.id.as_str())
        .bind(paste.content.as_str())
        .bind(paste.created_at)
        .bind(paste.expires_at)
        .bind(paste.max_views)
        .bind(paste.views)
        .execute(&mut conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn consume_paste(&self, id: &str, now: i64) -> crate::ApiResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        // check and increment in one statement; no row means the paste was not served
        let consumed = sqlx::query_as::<_, Paste>(
            "UPDATE pastes SET views = views + 1 WHERE id = ? AND (expires_at IS NULL OR \
             expires_at > ?) AND (max_views IS NULL OR views < max_views) RETURNING id, \
             content, created_at, expires_at, max_views, views",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&mut conn)
        .await?;
        drop(conn);

        if let Some(paste) = consumed {
            return Ok(paste);
        }

        // unavailability is permanent, so a later read gives the same reason
        let paste = self.get_paste(id).await?.ok_or(Unavailable::NotFound)?;
        match paste.check_available(now) {
            Err(reason) => Err(reason.into()),
            Ok(()) => {
                warn!("paste {id} was available on re-read after a refused update");
                Err(Unavailable::NotFound.into())
            }
        }
    }

    async fn ping(&self) -> crate::ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}
