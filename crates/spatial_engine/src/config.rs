//! Registry configuration
//!
//! Tunables for the scene registry's query filters, loadable from TOML so
//! applications can tune scenes without recompiling.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Query filter tunables for a [`SceneRegistry`](crate::SceneRegistry).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Half-extent of the cube around a query's reference point inside
    /// which entities are considered at all. Entities beyond it are
    /// skipped outright unless tagged always-considered.
    pub render_distance: f32,

    /// Half-extent of the broad-phase cube around a colliding entity's
    /// position. Bodies whose centers fall outside never reach the
    /// precise separating-axis test.
    pub collision_radius: f32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            render_distance: 100.0,
            collision_radius: 5.0,
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from TOML text. Missing fields fall back to
    /// their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] when the text is not valid TOML or a field
    /// has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] when its contents do not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.render_distance, 100.0);
        assert_eq!(config.collision_radius, 5.0);
    }

    #[test]
    fn test_parse_full_and_partial_toml() {
        let config = RegistryConfig::from_toml_str(
            "render_distance = 40.0\ncollision_radius = 2.5\n",
        )
        .unwrap();
        assert_eq!(config.render_distance, 40.0);
        assert_eq!(config.collision_radius, 2.5);

        // Missing fields fall back to defaults
        let config = RegistryConfig::from_toml_str("render_distance = 40.0\n").unwrap();
        assert_eq!(config.render_distance, 40.0);
        assert_eq!(config.collision_radius, 5.0);
    }

    #[test]
    fn test_parse_error_is_surfaced() {
        let result = RegistryConfig::from_toml_str("render_distance = \"near\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
