use directories::ProjectDirs;
use serde::Deserialize;

use crate::gaps;

/// Env var consulted when the config file has no API token.
pub const TOKEN_ENV_VAR: &str = "SEGUE_API_TOKEN";

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog Web API base URL.
    pub api_base_url: String,
    /// Bearer token for the catalog API (SEGUE_API_TOKEN covers absence).
    pub api_token: Option<String>,
    /// Transition score below which a pair counts as a gap.
    pub gap_threshold: f64,
    /// Cap on bridge recommendations per run.
    pub max_recommendations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            api_token: None,
            gap_threshold: gaps::DEFAULT_GAP_THRESHOLD,
            max_recommendations: gaps::MAX_RECOMMENDATIONS,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/segue/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve the API token: config file value, then environment.
    pub fn resolve_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Get the config file path.
    fn config_path() -> Option<std::path::PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "https://api.spotify.com/v1");
        assert!(config.api_token.is_none());
        assert_eq!(config.gap_threshold, 2.0);
        assert_eq!(config.max_recommendations, 5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(r#"gap_threshold = 2.5"#).unwrap();
        assert_eq!(config.gap_threshold, 2.5);
        assert_eq!(config.max_recommendations, 5);
        assert_eq!(config.api_base_url, "https://api.spotify.com/v1");
    }

    #[test]
    fn test_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            api_base_url = "https://catalog.example.com/api"
            api_token = "secret"
            gap_threshold = 1.5
            max_recommendations = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://catalog.example.com/api");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.max_recommendations, 3);
    }

    #[test]
    fn test_config_token_wins_over_env() {
        let config = AppConfig {
            api_token: Some("from-file".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_token().as_deref(), Some("from-file"));
    }
}
