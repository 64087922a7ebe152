//! Runtime configuration
//!
//! Loaded from a TOML file. Every field has a default, so a missing file or a
//! partial one still yields a usable configuration.
//!
//! ```toml
//! coordinate_space = "page"
//! resize_throttle_ms = 33
//! channel_capacity = 1000
//!
//! [element]
//! offset_left = 10.0
//! offset_top = 20.0
//! client_width = 800
//! client_height = 600
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::geometry::ElementLayout;
use crate::pointer::CoordinateSpace;
use crate::resize::{ThrottleSettings, DEFAULT_RESIZE_THROTTLE_MS};

const CONFIG_DIR_NAME: &str = "pointer-ports";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PortsConfig {
    /// Coordinates pointer positions are derived from
    pub coordinate_space: CoordinateSpace,

    /// Resize throttle window in milliseconds
    pub resize_throttle_ms: u64,

    /// Buffer size of the outbound port channel and the bridge inbox
    pub channel_capacity: usize,

    /// Initial reference element geometry, used by hosts without live layout
    pub element: Option<ElementLayout>,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            coordinate_space: CoordinateSpace::Page,
            resize_throttle_ms: DEFAULT_RESIZE_THROTTLE_MS,
            channel_capacity: 1000,
            element: None,
        }
    }
}

impl PortsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// `<config dir>/pointer-ports/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn throttle_settings(&self) -> ThrottleSettings {
        ThrottleSettings {
            window_ms: self.resize_throttle_ms,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resize_throttle_ms == 0 {
            return Err(ConfigError::Invalid(
                "resize_throttle_ms must be greater than zero".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PortsConfig::from_toml_str("").unwrap();

        assert_eq!(config, PortsConfig::default());
        assert_eq!(config.throttle_settings().window_ms, 33);
        assert_eq!(config.coordinate_space, CoordinateSpace::Page);
    }

    #[test]
    fn parses_full_document() {
        let config = PortsConfig::from_toml_str(
            r#"
            coordinate_space = "client"
            resize_throttle_ms = 50
            channel_capacity = 8

            [element]
            offset_left = 10.0
            offset_top = 20.0
            client_width = 800
            client_height = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.coordinate_space, CoordinateSpace::Client);
        assert_eq!(config.resize_throttle_ms, 50);
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(
            config.element,
            Some(ElementLayout {
                offset_left: 10.0,
                offset_top: 20.0,
                client_width: 800,
                client_height: 600,
            })
        );
    }

    #[test]
    fn rejects_zero_window_and_capacity() {
        assert!(matches!(
            PortsConfig::from_toml_str("resize_throttle_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PortsConfig::from_toml_str("channel_capacity = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_coordinate_space() {
        assert!(matches!(
            PortsConfig::from_toml_str(r#"coordinate_space = "screen""#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file_and_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let missing = PortsConfig::load_or_default(&path).unwrap();
        assert_eq!(missing, PortsConfig::default());
        assert!(matches!(PortsConfig::load(&path), Err(ConfigError::Io { .. })));

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "resize_throttle_ms = 16").unwrap();

        let loaded = PortsConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.resize_throttle_ms, 16);
    }
}
