use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::docker::PostgresOptions;

/// Defaults for containers created from the "Create PostgreSQL" menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresDefaults {
    pub image: String,
    pub tag: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub host_port: u16,
}

impl Default for PostgresDefaults {
    fn default() -> Self {
        Self {
            image: "postgres".to_string(),
            tag: "16".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "postgres".to_string(),
            host_port: 5432,
        }
    }
}

impl PostgresDefaults {
    /// Options for a new container. `input` is `name` or `name:port`.
    pub fn options_for(&self, input: &str) -> Option<PostgresOptions> {
        let input = input.trim();
        let (name, port) = match input.rsplit_once(':') {
            Some((name, port)) => (name.trim(), port.trim().parse().ok()?),
            None => (input, self.host_port),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        Some(PostgresOptions {
            name: name.to_string(),
            image: self.image.clone(),
            tag: self.tag.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            host_port: port,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runtime CLI to invoke.
    pub docker_binary: String,
    /// Upper bound, in seconds, for ordinary CLI calls.
    pub command_timeout: u64,
    /// Upper bound, in seconds, for stats and the daemon probe.
    pub stats_timeout: u64,
    /// Upper bound, in seconds, for `docker run` (may pull an image).
    pub create_timeout: u64,
    pub log_tail: usize,
    pub stats_refresh_ms: u64,
    pub desktop_notifications: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub postgres: PostgresDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docker_binary: "docker".to_string(),
            command_timeout: 30,
            stats_timeout: 5,
            create_timeout: 300,
            log_tail: crate::docker::DEFAULT_LOG_TAIL,
            stats_refresh_ms: 2000,
            desktop_notifications: false,
            log_level: "info".to_string(),
            log_file: None,
            postgres: PostgresDefaults::default(),
        }
    }
}
