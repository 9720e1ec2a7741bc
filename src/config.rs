//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dskview/dskview.toml`
//! 3. Local config: `<dir>/.dskview.toml`
//! 4. Environment variables: `DSKVIEW_*` prefix
//! 5. Command line flags (applied by the caller via `with_overrides`)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::infrastructure::api::ApiVersion;

/// Document rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocConfig {
    /// Orphan selectors on top of the built-in ones (e.g. ["p > iframe"])
    pub orphans: Vec<String>,
    /// Element types whose content is kept verbatim
    pub preformatted: Vec<String>,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            orphans: vec![],
            preformatted: vec!["pre".into(), "codeblock".into(), "playground".into()],
        }
    }
}

/// Raw doc config for intermediate parsing (arrays are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDocConfig {
    pub orphans: Option<Vec<String>>,
    pub preformatted: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_url: Option<String>,
    pub api_version: Option<ApiVersion>,
    pub source: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub doc: RawDocConfig,
}

impl DocConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for item in overlay {
            if let Some(negated) = item.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(item.clone());
            }
        }

        // Sorted for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base) with union semantics.
    pub fn merge(&self, overlay: &RawDocConfig) -> Self {
        Self {
            orphans: overlay
                .orphans
                .as_ref()
                .map(|o| Self::merge_array(&self.orphans, o))
                .unwrap_or_else(|| self.orphans.clone()),
            preformatted: overlay
                .preformatted
                .as_ref()
                .map(|o| Self::merge_array(&self.preformatted, o))
                .unwrap_or_else(|| self.preformatted.clone()),
        }
    }

    /// Apply global config onto defaults.
    ///
    /// Unlike `merge()`, arrays specified globally REPLACE the defaults.
    pub fn apply_global(&self, global: &RawDocConfig) -> Self {
        Self {
            orphans: global
                .orphans
                .clone()
                .unwrap_or_else(|| self.orphans.clone()),
            preformatted: global
                .preformatted
                .clone()
                .unwrap_or_else(|| self.preformatted.clone()),
        }
    }
}

/// Unified configuration for dskview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Backend base url
    pub api_url: String,
    /// Endpoint family, v1 or v2
    pub api_version: ApiVersion,
    /// Source (version) to browse; backend default if unset
    pub source: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Document rendering settings
    pub doc: DocConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".into(),
            api_version: ApiVersion::default(),
            source: None,
            timeout_secs: 30,
            doc: DocConfig::default(),
        }
    }
}

/// Get the XDG config directory for dskview.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dskview").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dskview.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".dskview.toml")
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
    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_url: overlay
                .api_url
                .clone()
                .unwrap_or_else(|| self.api_url.clone()),
            api_version: overlay.api_version.unwrap_or(self.api_version),
            source: overlay.source.clone().or_else(|| self.source.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            doc: self.doc.merge(&overlay.doc),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            doc: self.doc.apply_global(&global.doc),
            ..self.merge_with(&RawSettings {
                doc: RawDocConfig::default(),
                ..global.clone()
            })
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `dir` - Optional directory holding a local `.dskview.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE
    pub fn load(dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let current = Self::load_files(global.as_deref(), dir)?;
        Self::apply_env_overrides(current)
    }

    /// Load defaults plus the given config files, without env overrides.
    pub fn load_files(global: Option<&Path>, dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            debug!("loading global config {}", global_path.display());
            let raw = load_raw_settings(global_path)?;
            current = current.apply_global(&raw);
        }

        if let Some(dir) = dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Ok(current)
    }

    /// Apply DSKVIEW_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("DSKVIEW")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("doc.orphans")
                .with_list_parse_key("doc.preformatted"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("api_url") {
            settings.api_url = val;
        }
        if let Ok(val) = config.get_string("api_version") {
            settings.api_version = val.parse().map_err(|message| ApplicationError::Config {
                message: format!("DSKVIEW_API_VERSION: {message}"),
            })?;
        }
        if let Ok(val) = config.get_string("source") {
            settings.source = Some(val);
        }
        if let Ok(val) = config.get::<u64>("timeout_secs") {
            settings.timeout_secs = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("doc.orphans") {
            settings.doc.orphans = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("doc.preformatted") {
            settings.doc.preformatted = val;
        }

        Ok(settings)
    }

    /// Apply command line flags, the highest precedence layer.
    pub fn with_overrides(mut self, api_url: Option<String>, source: Option<String>) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if source.is_some() {
            self.source = source;
        }
        self
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dskview configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/dskview/dskview.toml  (defines your baseline)
#   Local:  <dir>/.dskview.toml             (project-specific additions)
#   Env:    DSKVIEW_* environment variables (explicit overrides)
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global.
#   Use "!item" in local config to REMOVE an inherited item:
#     preformatted = ["figure", "!playground"]

# Backend base url
# api_url = "http://127.0.0.1:8080"

# Endpoint family: "v1" or "v2"
# api_version = "v2"

# Source (version) to browse, backend default if unset
# source = "main"

# HTTP timeout in seconds
# timeout_secs = 30

[doc]
# Additional orphan selectors, lifted out of their parent before rendering
# orphans = ["p > iframe"]

# Element types whose content is kept verbatim
# preformatted = ["pre", "codeblock", "playground"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
