// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SizeFitError, SizeFitResult};
use crate::utils::logging::LogLevel;

/// Config file name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "sizefit.toml";

/// Encoder settings shared by every encode request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit encoder binary; `PATH` lookup when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder: Option<PathBuf>,
    pub log_level: String,
    /// Base encoder arguments. `{input}`, `{start}`, `{end}` and `{duration}` are filled per request.
    pub base_args: Vec<String>,
    /// Container forced on the discarded pass-1 output
    pub container: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            encoder: None,
            log_level: "info".to_string(),
            base_args: [
                "-ss", "{start}", "-i", "{input}", "-t", "{duration}", "-c:v", "libvpx", "-an",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            container: "webm".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> SizeFitResult<()> {
        LogLevel::parse(&self.log_level)?;

        if self.base_args.is_empty() {
            return Err(SizeFitError::config("base_args cannot be empty"));
        }
        if self.container.trim().is_empty() {
            return Err(SizeFitError::config("container cannot be empty"));
        }

        Ok(())
    }
}

/// On-disk layout: everything lives under a `[sizefit]` table
#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(default)]
    sizefit: AppConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse config from a TOML string
    pub fn parse(toml_content: &str) -> SizeFitResult<AppConfig> {
        let file: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| SizeFitError::config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.sizefit)
    }

    /// Load config from a file that must exist
    pub fn load(path: &Path) -> SizeFitResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SizeFitError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::parse(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load the explicit file when given, otherwise the first default location
    /// that exists, otherwise built-in defaults
    pub fn load_or_default(explicit: Option<&Path>) -> SizeFitResult<AppConfig> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for candidate in Self::default_config_paths() {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(AppConfig::default())
    }

    /// Serialize config to a TOML string
    pub fn to_toml(config: &AppConfig) -> SizeFitResult<String> {
        let file = ConfigFile {
            sizefit: config.clone(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| SizeFitError::config(format!("Failed to serialize config: {}", e)))
    }

    /// `./sizefit.toml`, then the per-user config directory
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = Self::user_config_dir() {
            paths.push(dir.join("config.toml"));
        }
        paths
    }

    fn user_config_dir() -> Option<PathBuf> {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("SizeFit"));
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("sizefit"));
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("sizefit"))
    }
}
