//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ruledoc/ruledoc.toml`
//! 3. Local config: `<rules_dir>/.ruledoc.toml`
//! 4. Environment variables: `RULEDOC_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Optional parts of the generated site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureToggles {
    /// Render the requires tree on rule pages
    pub requires_tree: bool,
    /// Render the ensures tree on rule pages
    pub ensures_tree: bool,
    /// Copy rule sources into the report and link them
    pub copy_sources: bool,
    /// Show explanatory help text on rule pages
    pub help: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            requires_tree: true,
            ensures_tree: true,
            copy_sources: true,
            help: true,
        }
    }
}

/// Raw feature toggles for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFeatureToggles {
    pub requires_tree: Option<bool>,
    pub ensures_tree: Option<bool>,
    pub copy_sources: Option<bool>,
    pub help: Option<bool>,
}

impl FeatureToggles {
    /// Overlay wins where specified.
    pub fn merge(&self, overlay: &RawFeatureToggles) -> Self {
        Self {
            requires_tree: overlay.requires_tree.unwrap_or(self.requires_tree),
            ensures_tree: overlay.ensures_tree.unwrap_or(self.ensures_tree),
            copy_sources: overlay.copy_sources.unwrap_or(self.copy_sources),
            help: overlay.help.unwrap_or(self.help),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub rules_dir: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub javadoc_base_url: Option<String>,
    #[serde(default)]
    pub features: RawFeatureToggles,
}

/// Unified configuration for ruledoc.
///
/// Passed explicitly to the services that need it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory containing rule sources
    pub rules_dir: Option<PathBuf>,
    /// Output directory of the generated site (default: ./ruledoc-report)
    pub report_dir: PathBuf,
    /// Base URL of the API documentation, e.g. https://docs.oracle.com/javase/8/docs/api/
    pub javadoc_base_url: Option<String>,
    /// Optional site parts
    pub features: FeatureToggles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_dir: None,
            report_dir: PathBuf::from("ruledoc-report"),
            javadoc_base_url: None,
            features: FeatureToggles::default(),
        }
    }
}

/// Get the XDG config directory for ruledoc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ruledoc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ruledoc.toml"))
}

/// Get the path to the local config file in a rules directory.
pub fn local_config_path(rules_dir: &Path) -> PathBuf {
    rules_dir.join(".ruledoc.toml")
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

impl Settings {
    /// Rule pages directory inside the report.
    pub fn rules_pages_dir(&self) -> PathBuf {
        self.report_dir.join("rules")
    }

    /// Copied rule sources directory inside the report.
    pub fn sources_dir(&self) -> PathBuf {
        self.report_dir.join("sources")
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.report_dir.to_string_lossy().as_ref());
        self.report_dir = PathBuf::from(expanded);

        if let Some(rules_dir) = &self.rules_dir {
            self.rules_dir = Some(PathBuf::from(expand_env_vars(
                rules_dir.to_string_lossy().as_ref(),
            )));
        }
    }

    /// Merge overlay config onto self (base); overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            rules_dir: overlay.rules_dir.clone().or_else(|| self.rules_dir.clone()),
            report_dir: overlay
                .report_dir
                .clone()
                .unwrap_or_else(|| self.report_dir.clone()),
            javadoc_base_url: overlay
                .javadoc_base_url
                .clone()
                .or_else(|| self.javadoc_base_url.clone()),
            features: self.features.merge(&overlay.features),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `rules_dir` - Rules directory whose `.ruledoc.toml` is merged. When
    ///   None, the `rules_dir` of the global config is used if present.
    pub fn load(rules_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = rules_dir {
            current.rules_dir = Some(dir.to_path_buf());
        }

        // 3. Local config next to the rules
        if let Some(dir) = current.rules_dir.clone() {
            let local_path = local_config_path(&dir);
            if local_path.exists() {
                debug!("loading local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
                // The rules directory the config was found in stays authoritative
                current.rules_dir = Some(dir);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply RULEDOC_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RULEDOC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("rules_dir") {
            settings.rules_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("report_dir") {
            settings.report_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("javadoc_base_url") {
            settings.javadoc_base_url = Some(val);
        }
        if let Ok(val) = config.get_bool("features.requires_tree") {
            settings.features.requires_tree = val;
        }
        if let Ok(val) = config.get_bool("features.ensures_tree") {
            settings.features.ensures_tree = val;
        }
        if let Ok(val) = config.get_bool("features.copy_sources") {
            settings.features.copy_sources = val;
        }
        if let Ok(val) = config.get_bool("features.help") {
            settings.features.help = val;
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
        r#"# ruledoc configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/ruledoc/ruledoc.toml
#   Local:  <rules_dir>/.ruledoc.toml
#   Env:    RULEDOC_* environment variables (RULEDOC_FEATURES__HELP=false)

# Directory containing *.crysl rule sources
# rules_dir = "~/rules"

# Output directory of the generated site
# report_dir = "ruledoc-report"

# Base URL for API documentation links
# javadoc_base_url = "https://docs.oracle.com/javase/8/docs/api/"

[features]
# requires_tree = true
# ensures_tree = true
# copy_sources = true
# help = true
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
    fn given_defaults_when_created_then_all_features_enabled() {
        let settings = Settings::default();
        assert_eq!(settings.report_dir, PathBuf::from("ruledoc-report"));
        assert!(settings.features.requires_tree);
        assert!(settings.features.ensures_tree);
        assert!(settings.features.copy_sources);
        assert!(settings.features.help);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_overlay_wins_where_specified() {
        let base = Settings::default();
        let overlay = RawSettings {
            report_dir: Some(PathBuf::from("out")),
            javadoc_base_url: Some("https://example.org/api/".to_string()),
            features: RawFeatureToggles {
                help: Some(false),
                ..RawFeatureToggles::default()
            },
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.report_dir, PathBuf::from("out"));
        assert_eq!(merged.javadoc_base_url.as_deref(), Some("https://example.org/api/"));
        assert!(!merged.features.help);
        assert!(merged.features.requires_tree);
        assert!(merged.rules_dir.is_none());
    }

    #[test]
    fn given_tilde_in_report_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            report_dir: PathBuf::from("~/report"),
            rules_dir: Some(PathBuf::from("$HOME/rules")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.report_dir.to_string_lossy().starts_with(&home));
        assert!(settings
            .rules_dir
            .as_ref()
            .is_some_and(|d| d.to_string_lossy().starts_with(&home)));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.report_dir.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_report_dir() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("report_dir = \"ruledoc-report\""));
    }
}
