//! A small paste service: store text, hand out an id, serve it back until it expires or runs
//! out of views.

use axum::extract::FromRef;

pub mod clock;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod error;
pub mod keys;
pub mod models;
pub mod pages;
pub mod storage;
pub mod types;

pub use crate::config::Config;
pub use crate::error::{ApiError, ApiResult};
use crate::storage::AnyStorage;

/// Shared state handed to every request handler.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub storage: AnyStorage,
}

impl App {
    /// Open the configured storage backend.
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        let storage = AnyStorage::open(&config.storage).await?;
        Ok(App { config, storage })
    }
}
