//! Application configuration for profilegen.
//!
//! User config lives at `~/.profilegen/profilegen.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProfilegenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "profilegen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".profilegen";

// ---------------------------------------------------------------------------
// Config structs (matching profilegen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input document locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Content size budgets.
    #[serde(default)]
    pub budgets: BudgetsConfig,

    /// Canonical short-name table: department alias → full unit path.
    ///
    /// Consulted before fuzzy name matching, so an alias is the supported
    /// way to pin a short name to a specific unit when several units share
    /// it.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Hierarchical organization document (JSON).
    #[serde(default = "default_org_chart")]
    pub org_chart: String,

    /// Directory holding named metric reference documents.
    #[serde(default = "default_metrics_dir")]
    pub metrics_dir: String,

    /// Large static reference document compressed per role category.
    #[serde(default = "default_reference_doc")]
    pub reference_doc: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            org_chart: default_org_chart(),
            metrics_dir: default_metrics_dir(),
            reference_doc: default_reference_doc(),
        }
    }
}

fn default_org_chart() -> String {
    "data/orgchart.json".into()
}
fn default_metrics_dir() -> String {
    "data/metrics".into()
}
fn default_reference_doc() -> String {
    "data/reference.md".into()
}

/// `[budgets]` section.
///
/// Character ceilings per content slot; token estimates divide character
/// counts by `chars_per_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetsConfig {
    /// Ceiling for resolved metric-document text.
    #[serde(default = "default_metric_ceiling")]
    pub metric_char_ceiling: usize,

    /// Ceiling for the full reference tier.
    #[serde(default = "default_full_ceiling")]
    pub reference_full_ceiling: usize,

    /// Ceiling for the compressed-summary reference tier.
    #[serde(default = "default_compressed_ceiling")]
    pub reference_compressed_ceiling: usize,

    /// Ceiling for the domain-filtered reference tier.
    #[serde(default = "default_filtered_ceiling")]
    pub reference_filtered_ceiling: usize,

    /// Ceiling for the minimal-overview reference tier.
    #[serde(default = "default_minimal_ceiling")]
    pub reference_minimal_ceiling: usize,

    /// Approximate characters per token for budget reporting.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,
}

impl Default for BudgetsConfig {
    fn default() -> Self {
        Self {
            metric_char_ceiling: default_metric_ceiling(),
            reference_full_ceiling: default_full_ceiling(),
            reference_compressed_ceiling: default_compressed_ceiling(),
            reference_filtered_ceiling: default_filtered_ceiling(),
            reference_minimal_ceiling: default_minimal_ceiling(),
            chars_per_token: default_chars_per_token(),
        }
    }
}

fn default_metric_ceiling() -> usize {
    12_000
}
fn default_full_ceiling() -> usize {
    60_000
}
fn default_compressed_ceiling() -> usize {
    16_000
}
fn default_filtered_ceiling() -> usize {
    12_000
}
fn default_minimal_ceiling() -> usize {
    4_500
}
fn default_chars_per_token() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.profilegen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProfilegenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.profilegen/profilegen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ProfilegenError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ProfilegenError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ProfilegenError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ProfilegenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ProfilegenError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("org_chart"));
        assert!(toml_str.contains("metric_char_ceiling"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.budgets.chars_per_token, 4);
        assert_eq!(parsed.paths.metrics_dir, "data/metrics");
    }

    #[test]
    fn config_with_aliases() {
        let toml_str = r#"
[paths]
org_chart = "/srv/org/chart.json"

[aliases]
"IT" = "Operations Block / IT Department"
"Accounting" = "Finance Block / Accounting Department"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.aliases.len(), 2);
        assert_eq!(
            config.aliases.get("IT").map(String::as_str),
            Some("Operations Block / IT Department")
        );
        // Untouched sections fall back to defaults
        assert_eq!(config.budgets.metric_char_ceiling, 12_000);
    }

    #[test]
    fn minimal_ceiling_stays_under_scenario_bound() {
        // The minimal-overview tier is contractually bounded below 5,000 chars.
        assert!(BudgetsConfig::default().reference_minimal_ceiling < 5_000);
    }
}
