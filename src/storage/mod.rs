use crate::config::{self, StorageKind};
use crate::models::Paste;

pub mod memory;
pub mod sql;

pub use memory::MemoryStorage;
pub use sql::SqlStorage;

/// A paste backend. Implementations do their own locking and are shared across requests.
pub trait Storage {
    /// Insert a paste unless its id is already taken. Returns whether it was inserted.
    async fn put_paste(&self, paste: &Paste) -> crate::ApiResult<bool>;

    /// Check availability at `now` and count one view, as a single atomic step.
    ///
    /// Returns the paste as it is after the increment.
    async fn consume_paste(&self, id: &str, now: i64) -> crate::ApiResult<Paste>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> crate::ApiResult<()>;
}

#[derive(Clone)]
pub enum AnyStorage {
    Memory(MemoryStorage),
    Sql(SqlStorage),
}

impl AnyStorage {
    /// Open the backend selected in the configuration.
    pub async fn open(config: &config::Storage) -> anyhow::Result<Self> {
        Ok(match config.kind {
            StorageKind::Memory => MemoryStorage::default().into(),
            StorageKind::Sql => {
                SqlStorage::connect(&config.database_url, config.max_connections)
                    .await?
                    .into()
            }
        })
    }
}

impl Storage for AnyStorage {
    async fn put_paste(&self, paste: &Paste) -> crate::ApiResult<bool> {
        match self {
            AnyStorage::Memory(memory) => memory.put_paste(paste).await,
            AnyStorage::Sql(sql) => sql.put_paste(paste).await,
        }
    }

    async fn consume_paste(&self, id: &str, now: i64) -> crate::ApiResult<Paste> {
        match self {
            AnyStorage::Memory(memory) => memory.consume_paste(id, now).await,
            AnyStorage::Sql(sql) => sql.consume_paste(id, now).await,
        }
    }

    async fn ping(&self) -> crate::ApiResult<()> {
        match self {
            AnyStorage::Memory(memory) => memory.ping().await,
            AnyStorage::Sql(sql) => sql.ping().await,
        }
    }
}

impl From<MemoryStorage> for AnyStorage {
    fn from(value: MemoryStorage) -> Self {
        AnyStorage::Memory(value)
    }
}

impl From<SqlStorage> for AnyStorage {
    fn from(value: SqlStorage) -> Self {
        AnyStorage::Sql(value)
    }
}
