//! Configuration for Tableside.
//!
//! Read once at startup from `~/.tableside/config.toml`. Every section is
//! optional; a missing file means defaults everywhere.
//!
//! ```toml
//! [app]
//! environment = "development"
//! ascii_only = false
//! high_contrast = false
//!
//! [boundary]
//! max_retries = 3
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use tableside_types::ui::UiOptions;
use tableside_types::{DEFAULT_MAX_RETRIES, DiagnosticsPolicy};

/// Overrides `app.environment` when set.
pub const ENVIRONMENT_ENV_VAR: &str = "TABLESIDE_ENV";

#[derive(Debug, Default, Deserialize)]
pub struct TablesideConfig {
    pub app: Option<AppConfig>,
    pub boundary: Option<BoundaryConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// `development` exposes fault diagnostics; anything else hides them.
    pub environment: Option<String>,
    /// Use ASCII-only glyphs.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct BoundaryConfig {
    /// Retry budget per boundary before it is exhausted. Default: 3.
    pub max_retries: Option<u32>,
}

impl TablesideConfig {
    /// Loads the config from the default path. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.boundary
            .as_ref()
            .and_then(|b| b.max_retries)
            .unwrap_or(DEFAULT_MAX_RETRIES)
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
            })
            .unwrap_or_default()
    }

    /// Resolves the diagnostics policy, letting `TABLESIDE_ENV` win over the file.
    #[must_use]
    pub fn diagnostics_policy(&self) -> DiagnosticsPolicy {
        let from_env = std::env::var(ENVIRONMENT_ENV_VAR).ok();
        resolve_policy(
            self.app.as_ref().and_then(|app| app.environment.as_deref()),
            from_env.as_deref(),
        )
    }
}

fn resolve_policy(configured: Option<&str>, from_env: Option<&str>) -> DiagnosticsPolicy {
    from_env
        .or(configured)
        .map(DiagnosticsPolicy::from_environment)
        .unwrap_or_default()
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tableside").join("config.toml"))
}
