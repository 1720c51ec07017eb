//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/diagtree/diagtree.toml`
//! 3. Local config: `<base_dir>/.diagtree.toml`
//! 4. Environment variables: `DIAGTREE_*` prefix (`__` separates sections)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Output format of the batch validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Batch validation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidateConfig {
    /// Treat lint warnings as failures
    pub strict: bool,
    /// Report format
    pub format: OutputFormat,
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub trees_dir: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub validate: RawValidateConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawValidateConfig {
    pub strict: Option<bool>,
    pub format: Option<OutputFormat>,
}

/// Unified configuration for diagtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned by `validate` when no path is given
    pub trees_dir: PathBuf,
    /// File extensions recognized as tree descriptions
    pub extensions: Vec<String>,
    pub validate: ValidateConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trees_dir: PathBuf::from("."),
            extensions: vec!["json".into(), "toml".into()],
            validate: ValidateConfig::default(),
        }
    }
}

/// Get the XDG config directory for diagtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "diagtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("diagtree.toml"))
}

/// Get the path to the local config file in a base directory.
pub fn local_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(".diagtree.toml")
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

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input unchanged when expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.trees_dir.to_string_lossy().as_ref());
        self.trees_dir = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value; arrays are replaced, not merged.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            trees_dir: overlay
                .trees_dir
                .clone()
                .unwrap_or_else(|| self.trees_dir.clone()),
            extensions: overlay
                .extensions
                .clone()
                .unwrap_or_else(|| self.extensions.clone()),
            validate: ValidateConfig {
                strict: overlay.validate.strict.unwrap_or(self.validate.strict),
                format: overlay.validate.format.unwrap_or(self.validate.format),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `base_dir` - Optional directory holding a local `.diagtree.toml`
    ///
    /// A relative `trees_dir` from the local config is resolved against `base_dir`.
    pub fn load(base_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(base) = base_dir {
            let local_path = local_config_path(base);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.trees_dir = raw.trees_dir.map(|dir| {
                    let dir = PathBuf::from(expand_env_vars(dir.to_string_lossy().as_ref()));
                    if dir.is_relative() {
                        base.join(dir)
                    } else {
                        dir
                    }
                });
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply DIAGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DIAGTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("extensions")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("trees_dir") {
            settings.trees_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<Vec<String>>("extensions") {
            settings.extensions = val;
        }
        if let Ok(val) = config.get_bool("validate.strict") {
            settings.validate.strict = val;
        }
        if let Ok(val) = config.get_string("validate.format") {
            settings.validate.format = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
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
        r#"# diagtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/diagtree/diagtree.toml
#   Local:  <dir>/.diagtree.toml          (dir = -C argument or cwd)
#   Env:    DIAGTREE_* environment variables, e.g. DIAGTREE_VALIDATE__STRICT=true

# Directory scanned by `diagtree validate` when no path is given
# trees_dir = "trees"

# File extensions treated as tree descriptions
# extensions = ["json", "toml"]

[validate]
# Fail the batch when any lint warning is reported
# strict = false

# Report format: "text" or "json"
# format = "text"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_reads_json_and_toml() {
        let settings = Settings::default();
        assert_eq!(settings.trees_dir, PathBuf::from("."));
        assert_eq!(settings.extensions, vec!["json", "toml"]);
        assert!(!settings.validate.strict);
        assert_eq!(settings.validate.format, OutputFormat::Text);
    }

    #[test]
    fn given_overlay_when_merging_then_specified_fields_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            trees_dir: None,
            extensions: Some(vec!["json".into()]),
            validate: RawValidateConfig {
                strict: Some(true),
                format: None,
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.trees_dir, PathBuf::from("."));
        assert_eq!(merged.extensions, vec!["json"]);
        assert!(merged.validate.strict);
        assert_eq!(merged.validate.format, OutputFormat::Text);
    }

    #[test]
    fn given_tilde_in_trees_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            trees_dir: PathBuf::from("~/trees"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.trees_dir.starts_with(&home));
    }

    #[test]
    fn given_settings_when_serializing_then_template_and_toml_parse_back() {
        let toml_str = Settings::default().to_toml().unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Settings::default());
        let _: RawSettings = toml::from_str(&Settings::template()).unwrap();
    }

    #[test]
    fn given_format_strings_when_parsing_then_accepts_known_values() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
