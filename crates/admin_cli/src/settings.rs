//! Operator settings.
//!
//! Read from an optional `fundbook.toml`, then from `FUNDBOOK_*` environment
//! variables (`FUNDBOOK_SHARD_URLS` is comma separated). Command line flags
//! are applied on top by the caller.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    /// Database holding the `users` table.
    pub directory_url: String,
    /// One url per shard, in shard order. Empty: the directory database is
    /// the only shard.
    pub shard_urls: Vec<String>,
    /// Snowflake node, 0..=63.
    pub node_id: u8,
    /// Apply the schema migrations to every database before running.
    pub run_schema_migrations: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            directory_url: "sqlite:./fundbook.db?mode=rwc".to_string(),
            shard_urls: Vec::new(),
            node_id: 0,
            run_schema_migrations: false,
        }
    }
}

impl Settings {
    pub fn new(file: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("FUNDBOOK")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("shard_urls"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
