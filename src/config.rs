use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use anyhow::Context;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    /// Public base URL for links to created pastes; the request's host is used when unset.
    pub base_url: Option<String>,
    /// Honor the `x-test-now-ms` header when evaluating expiry and view limits.
    pub test_mode: bool,
    pub storage: Storage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub kind: StorageKind,
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Sql,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: None,
            test_mode: false,
            storage: Storage {
                kind: StorageKind::Sql,
                database_url: "sqlite://pastes.db?mode=rwc".to_owned(),
                max_connections: 5,
            },
        }
    }
}

impl Config {
    /// Load from defaults, an optional TOML file, then `PASTEBIN_*` variables.
    ///
    /// `TEST_MODE=1` also turns on test mode.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        file_layers(file)?
            .add_source(
                config::Environment::with_prefix("PASTEBIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option(
                "test_mode",
                std::env::var("TEST_MODE").ok().filter(|value| value == "1").map(|_| true),
            )?
            .build()
            .context("failed to read config")?
            .try_deserialize()
            .context("failed to deserialize config")
    }
}

/// Defaults with the TOML file on top; nothing here reads the process environment.
fn file_layers(file: Option<&Path>) -> anyhow::Result<ConfigBuilder<DefaultState>> {
    let defaults = Config::default();
    let file_source = match file {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    Ok(config::Config::builder()
        .set_default("address", defaults.address.to_string())?
        .set_default("port", i64::from(defaults.port))?
        .set_default("test_mode", defaults.test_mode)?
        .set_default("storage.kind", "sql")?
        .set_default("storage.database_url", defaults.storage.database_url)?
        .set_default(
            "storage.max_connections",
            i64::from(defaults.storage.max_connections),
        )?
        .add_source(file_source))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn from_file_only(path: &Path) -> Config {
        file_layers(Some(path))
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 8080\nbase_url = \"https://paste.example\"\n\n[storage]\nkind = \"memory\""
        )
        .unwrap();

        // the environment layers are left out, so PASTEBIN_* or TEST_MODE set in the shell
        // cannot change the outcome
        let config = from_file_only(file.path());
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url.as_deref(), Some("https://paste.example"));
        assert_eq!(config.storage.kind, StorageKind::Memory);
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(!config.test_mode);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let config = from_file_only(file.path());
        let defaults = Config::default();
        assert_eq!(config.port, defaults.port);
        assert_eq!(config.storage.kind, defaults.storage.kind);
        assert_eq!(config.storage.database_url, defaults.storage.database_url);
        assert!(!config.test_mode);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/pastebin.toml"))).is_err());
    }
}
