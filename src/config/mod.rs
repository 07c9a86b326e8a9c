/// Database connection and table creation
pub mod database;

/// Application settings loaded from `hillside.toml`
pub mod settings;

pub use settings::{AppConfig, load_config, load_default_config};
