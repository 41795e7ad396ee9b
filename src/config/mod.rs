mod loader;
mod types;

pub use loader::{ConfigError, FILE_NAME, apply_overrides, load, load_from, resolve, validate};
pub use types::{Config, PostgresDefaults};
