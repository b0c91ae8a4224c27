//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fortnum/fortnum.toml`
//! 3. Local config: `<dir>/.fortnum.toml` (usually the working directory)
//! 4. Environment variables: `FORTNUM_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for fortnum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Catalog file loaded when no `--catalog` is given (default: fortnum.toml)
    pub catalog: PathBuf,
    /// Related-link attribute for definitions that do not name one
    pub default_related_name: Option<String>,
    /// Mark abstract categories in tree output
    pub mark_abstract: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("fortnum.toml"),
            default_related_name: None,
            mark_abstract: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub catalog: Option<PathBuf>,
    pub default_related_name: Option<String>,
    pub mark_abstract: Option<bool>,
}

/// Get the XDG config directory for fortnum.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fortnum").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fortnum.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".fortnum.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand environment variables and `~` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.catalog.to_string_lossy().as_ref());
        self.catalog = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            catalog: overlay.catalog.clone().unwrap_or_else(|| self.catalog.clone()),
            default_related_name: overlay
                .default_related_name
                .clone()
                .or_else(|| self.default_related_name.clone()),
            mark_abstract: overlay.mark_abstract.unwrap_or(self.mark_abstract),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.fortnum.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply FORTNUM_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("FORTNUM").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("catalog") {
            settings.catalog = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_related_name") {
            settings.default_related_name = Some(val);
        }
        if let Ok(val) = config.get_bool("mark_abstract") {
            settings.mark_abstract = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# fortnum configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/fortnum/fortnum.toml
#   Local:  ./.fortnum.toml
#   Env:    FORTNUM_* environment variables

# Catalog loaded when --catalog is not given
# catalog = "fortnum.toml"

# Related-link attribute for definitions without their own related_name
# default_related_name = "categories"

# Mark abstract categories in tree output
# mark_abstract = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
