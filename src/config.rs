use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked for the Gemini key, in priority order.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    /// Base URL of the Generative Language API, without a trailing slash
    pub api_base: String,
    /// Language the coach should answer in
    pub response_language: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            response_language: "English".into(),
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    /// Directory: ~/.config/form-coach/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("form-coach");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, then apply environment overrides.
    /// A missing or invalid file yields defaults. Nothing is ever written back.
    pub fn load() -> Self {
        let path = Self::path();
        let mut config = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());
        if let Some(key) = from_env {
            self.gemini_api_key = key;
        }
    }

    /// The configured key, if any. Blank keys count as missing.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.gemini_api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": "gemini-2.5-pro"}"#).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout_secs, 120);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn env_key_wins_over_file() {
        let mut config = Config {
            gemini_api_key: "from-file".into(),
            ..Config::default()
        };
        config.apply_env(|name| (name == "GEMINI_API_KEY").then(|| "from-env".to_string()));
        assert_eq!(config.api_key(), Some("from-env"));
    }

    #[test]
    fn vite_key_is_a_fallback() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "GEMINI_API_KEY" => Some("  ".into()),
            "VITE_GEMINI_API_KEY" => Some("vite-key".into()),
            _ => None,
        });
        assert_eq!(config.api_key(), Some("vite-key"));
    }

    #[test]
    fn blank_key_is_missing() {
        let config = Config {
            gemini_api_key: "   ".into(),
            ..Config::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
