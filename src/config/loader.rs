use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::Config;

pub const FILE_NAME: &str = ".dockhand.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load config from `.dockhand.yaml` in `dir`, falling back to the home
/// directory, then to defaults. Environment overrides apply last.
pub fn load(dir: &Path) -> Result<Config, ConfigError> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut cfg = match resolve(dir, home.as_deref()) {
        Some(path) => load_from(&path)?,
        None => Config::default(),
    };
    apply_overrides(&mut cfg, |key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// First existing config file: `dir` wins over `home`.
pub fn resolve(dir: &Path, home: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(dir)
        .chain(home)
        .map(|d| d.join(FILE_NAME))
        .find(|p| p.is_file())
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// `DOCKER_BIN` and `DOCKHAND_LOG_FILE` take precedence over the file.
pub fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(bin) = lookup("DOCKER_BIN").filter(|v| !v.trim().is_empty()) {
        cfg.docker_binary = bin;
    }
    if let Some(path) = lookup("DOCKHAND_LOG_FILE").filter(|v| !v.trim().is_empty()) {
        cfg.log_file = Some(PathBuf::from(path));
    }
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.docker_binary.trim().is_empty() {
        return Err(ConfigError::Invalid("docker_binary must not be empty".into()));
    }
    for (name, value) in [
        ("command_timeout", cfg.command_timeout),
        ("stats_timeout", cfg.stats_timeout),
        ("create_timeout", cfg.create_timeout),
    ] {
        if value == 0 {
            return Err(ConfigError::Invalid(format!("{name} must be positive")));
        }
    }
    if cfg.log_tail == 0 {
        return Err(ConfigError::Invalid("log_tail must be positive".into()));
    }
    if cfg.stats_refresh_ms < 250 {
        return Err(ConfigError::Invalid(
            "stats_refresh_ms must be at least 250".into(),
        ));
    }
    Ok(())
}
