//! Application configuration for SchoolPrompt.
//!
//! User config lives at `~/.schoolprompt/schoolprompt.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchoolPromptError};
use crate::types::Purpose;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "schoolprompt.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".schoolprompt";

// ---------------------------------------------------------------------------
// Config structs (matching schoolprompt.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Form defaults applied when a flag is not given.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Reference data settings.
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Clipboard settings.
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Investigation purpose when `--purpose` is omitted.
    #[serde(default)]
    pub purpose: Purpose,

    /// Whether local-language search queries are included.
    #[serde(default = "default_true")]
    pub include_local_search: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            purpose: Purpose::default(),
            include_local_search: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[reference]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Optional TOML file whose country records overlay the built-in table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_path: Option<String>,
}

/// `[clipboard]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Where the manual-copy fallback file is written. Defaults to the temp dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_dir: Option<String>,
}

impl ClipboardConfig {
    /// Directory for the fallback file, resolved against the system temp dir.
    pub fn resolved_fallback_dir(&self) -> PathBuf {
        match self.fallback_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::temp_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.schoolprompt/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SchoolPromptError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.schoolprompt/schoolprompt.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SchoolPromptError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SchoolPromptError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| SchoolPromptError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SchoolPromptError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| SchoolPromptError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("purpose = \"new\""));
        assert!(toml_str.contains("include_local_search = true"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.purpose, Purpose::New);
        assert!(parsed.defaults.include_local_search);
        assert!(parsed.reference.extra_path.is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
purpose = "verify"

[reference]
extra_path = "/srv/countries-extra.toml"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.purpose, Purpose::Verify);
        assert!(config.defaults.include_local_search);
        assert_eq!(
            config.reference.extra_path.as_deref(),
            Some("/srv/countries-extra.toml")
        );
        assert_eq!(
            config.clipboard.resolved_fallback_dir(),
            std::env::temp_dir()
        );
    }

    #[test]
    fn unknown_purpose_is_rejected() {
        let result: std::result::Result<AppConfig, _> =
            toml::from_str("[defaults]\npurpose = \"audit\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn init_and_load_from_path() {
        let dir = std::env::temp_dir().join(format!("sp-config-test-{}", std::process::id()));
        let path = dir.join("nested").join(CONFIG_FILE_NAME);

        init_config_at(&path).expect("init config");
        let loaded = load_config_from(&path).expect("load config");
        assert_eq!(loaded.defaults.purpose, Purpose::New);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_config_from(Path::new("/nonexistent/schoolprompt.toml")).unwrap_err();
        assert!(matches!(err, SchoolPromptError::Io { .. }));
    }
}
