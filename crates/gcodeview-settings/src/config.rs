//! Conversion configuration for GCodeView
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats, by default stored in the
//! platform-specific configuration directory.
//!
//! Configuration is organized into logical sections:
//! - Filter settings (tools to render, support/infill suppression)
//! - Simplification tolerances
//! - Layer document settings (extruder separation)
//! - Mesh settings (ribbon width and height)
//! - Worker pool settings

use gcodeview_core::constants::DEFAULT_WORKERS;
use gcodeview_core::{
    ConversionOptions, FilterOptions, LayerOptions, LineHeight, MeshOptions, SimplifyTolerances,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Directory name used below the platform configuration directory.
const APP_DIR_NAME: &str = "gcodeview";

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of conversions running at once
    pub workers: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Complete conversion configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tool and geometry class filtering
    pub filter: FilterOptions,
    /// Point pruning tolerances
    pub simplify: SimplifyTolerances,
    /// Layer document settings
    pub layers: LayerOptions,
    /// Mesh document settings
    pub mesh: MeshOptions,
    /// Worker pool settings
    pub pool: PoolSettings,
}

/// Serialization format picked from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config dir>/gcodeview/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config at `path` or, when no path is given, the default
    /// location if a file exists there. Falls back to defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        match Self::default_path() {
            Ok(default) if default.is_file() => Self::load_from_file(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Options for a single conversion, everything except the pool section
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            filter: self.filter.clone(),
            simplify: self.simplify,
            layers: self.layers,
            mesh: self.mesh,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.simplify.area > 0.0) {
            return Err(invalid("simplify.area", "must be > 0"));
        }

        if !(self.simplify.angle > 0.0) {
            return Err(invalid("simplify.angle", "must be > 0"));
        }

        if !self.layers.extruder_separation.is_finite() {
            return Err(invalid("layers.extruder_separation", "must be finite"));
        }

        if !(self.mesh.line_width > 0.0) {
            return Err(invalid("mesh.line_width", "must be > 0"));
        }

        if let LineHeight::Fixed(height) = self.mesh.line_height {
            if !(height > 0.0) {
                return Err(invalid("mesh.line_height", "must be > 0"));
            }
        }

        if self.pool.workers == 0 {
            return Err(invalid("pool.workers", "must be > 0"));
        }

        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodeview_core::ToolSet;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.tools.len(), 7);
        assert_eq!(config.pool.workers, 6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.mesh.line_width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "mesh.line_width"
        ));

        let mut config = Config::default();
        config.mesh.line_height = LineHeight::Fixed(-1.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simplify.area = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pool.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.filter.tools = ToolSet::new([1, 0]).unwrap();
        config.filter.ignore_infill = true;
        config.mesh.line_height = LineHeight::Layer;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_partial_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"layers":{"extruder_separation":20.5}}"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.layers.extruder_separation, 20.5);
        assert_eq!(loaded.mesh, MeshOptions::default());
        assert_eq!(loaded.filter, FilterOptions::default());
    }

    #[test]
    fn test_conversion_options_mirror_sections() {
        let mut config = Config::default();
        config.filter.ignore_support = true;
        config.mesh.line_width = 0.5;

        let options = config.conversion_options();
        assert!(options.filter.ignore_support);
        assert_eq!(options.mesh.line_width, 0.5);
        assert_eq!(options.simplify, config.simplify);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "filter: {}").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(ref ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn test_load_or_default_with_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_or_default(Some(&path)),
            Err(SettingsError::LoadError(_))
        ));
    }

    #[test]
    fn test_invalid_tool_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"filter":{"tools":[0,8]}}"#).unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(SettingsError::JsonError(_))
        ));
    }
}
