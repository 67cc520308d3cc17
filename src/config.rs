//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/forestry/forestry.toml`
//! 3. Local config: `<dir>/.forestry.toml`
//! 4. Environment variables: `FORESTRY_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{CyclePolicy, Priority, Shape};

/// Unified configuration for forestry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Handling of parent cycles of two or more records
    pub cycle_policy: CyclePolicy,
    /// Default query shape for `list`
    pub shape: Shape,
    /// Which half comes first when listing linked and unlinked nodes together
    pub priority: Priority,
    /// Annotate listed nodes with their distance to base
    pub show_distance: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::Reject,
            shape: Shape::Linear,
            priority: Priority::LinkedFirst,
            show_distance: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub cycle_policy: Option<CyclePolicy>,
    pub shape: Option<Shape>,
    pub priority: Option<Priority>,
    pub show_distance: Option<bool>,
}

/// Get the XDG config directory for forestry.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "forestry").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("forestry.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".forestry.toml")
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value, otherwise keep self.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            cycle_policy: overlay.cycle_policy.unwrap_or(self.cycle_policy),
            shape: overlay.shape.unwrap_or(self.shape),
            priority: overlay.priority.unwrap_or(self.priority),
            show_distance: overlay.show_distance.unwrap_or(self.show_distance),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.forestry.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Load settings from one explicit file on top of defaults (no env, no global).
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply FORESTRY_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FORESTRY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("cycle_policy") {
            settings.cycle_policy = parse_override("cycle_policy", &val)?;
        }
        if let Ok(val) = config.get_string("shape") {
            settings.shape = parse_override("shape", &val)?;
        }
        if let Ok(val) = config.get_string("priority") {
            settings.priority = parse_override("priority", &val)?;
        }
        if let Ok(val) = config.get_bool("show_distance") {
            settings.show_distance = val;
        }

        Ok(settings)
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

fn parse_override<T>(key: &str, value: &str) -> Result<T, ApplicationError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|message| ApplicationError::Config {
        message: format!("FORESTRY_{}: {}", key.to_ascii_uppercase(), message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            cycle_policy: Some(CyclePolicy::Unlink),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.cycle_policy, CyclePolicy::Unlink);
        assert_eq!(merged.shape, base.shape);
        assert_eq!(merged.priority, base.priority);
    }

    #[test]
    fn test_to_toml_uses_lowercase_names() {
        let rendered = Settings::default().to_toml().unwrap();
        assert!(rendered.contains("cycle_policy = \"reject\""));
        assert!(rendered.contains("priority = \"linked\""));
    }
}
