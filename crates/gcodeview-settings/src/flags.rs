//! Parsing for boolean switches given as free text (CLI values, query strings).

use crate::error::{ConfigError, ConfigResult};

/// Parse a permissive boolean value.
///
/// Accepts `y`/`yes`/`t`/`true`/`on`/`1` and `n`/`no`/`f`/`false`/`off`/`0`,
/// case-insensitively and ignoring surrounding whitespace.
pub fn parse_bool(value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool(value.to_string())),
    }
}
