//! GCodeView Settings Crate
//!
//! Handles conversion configuration files and free-text flag parsing.

pub mod config;
pub mod error;
pub mod flags;

pub use config::{Config, PoolSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
pub use flags::parse_bool;
