//! Configuration types for the govsearch front-end.
//!
//! Loaded from `config.toml` (see [`AppConfig::default_config_path`]); every
//! section and field is optional and falls back to its default.

use std::path::{Path, PathBuf};

use govsearch_hybrid::config::{DEFAULT_FALLBACK_URL, DEFAULT_PROBE_TIMEOUT_SECS};
use govsearch_hybrid::{ClientConfig, HybridExecution, MergeMethod, SearchMode, SearchParams};
use serde::{Deserialize, Serialize};

use crate::chat::ChatContextPolicy;
use crate::error::{AppError, Result};

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "GOVSEARCH_API_URL";
/// Environment variable overriding `api.fallback_url`.
pub const ENV_FALLBACK_URL: &str = "GOVSEARCH_FALLBACK_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service endpoints and timeouts.
    pub api: ApiConfig,
    /// Search defaults.
    pub search: SearchSettings,
    /// Chat grounding.
    pub chat: ChatSettings,
}

/// Service endpoints and timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Primary service URL (may carry a stage prefix such as `/dev`).
    pub base_url: String,
    /// Local service used once the primary is unreachable.
    pub fallback_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Health probe timeout in seconds.
    pub probe_timeout_seconds: u64,
    /// Custom User-Agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FALLBACK_URL.to_owned(),
            fallback_url: DEFAULT_FALLBACK_URL.to_owned(),
            timeout_seconds: 30,
            probe_timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Which search mode a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePreference {
    /// Pick from the service's reported capabilities.
    #[default]
    Auto,
    /// Vector similarity only.
    Vector,
    /// Knowledge graph only.
    KnowledgeGraph,
    /// Both, merged.
    Hybrid,
}

impl ModePreference {
    /// The fixed mode, or `None` for [`ModePreference::Auto`].
    pub fn explicit(self) -> Option<SearchMode> {
        match self {
            Self::Auto => None,
            Self::Vector => Some(SearchMode::Vector),
            Self::KnowledgeGraph => Some(SearchMode::KnowledgeGraph),
            Self::Hybrid => Some(SearchMode::Hybrid),
        }
    }
}

impl From<SearchMode> for ModePreference {
    fn from(mode: SearchMode) -> Self {
        match mode {
            SearchMode::Vector => Self::Vector,
            SearchMode::KnowledgeGraph => Self::KnowledgeGraph,
            SearchMode::Hybrid => Self::Hybrid,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Mode preference.
    pub mode: ModePreference,
    /// Maximum results per search.
    pub limit: usize,
    /// Weight of vector similarity in weighted merges, `[0, 1]`.
    pub vector_weight: f64,
    /// Hybrid merge strategy.
    pub merge_method: MergeMethod,
    /// Run hybrid searches as two requests merged locally instead of
    /// letting the service merge.
    pub merge_locally: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            mode: ModePreference::Auto,
            limit: SearchParams::DEFAULT_LIMIT,
            vector_weight: SearchParams::DEFAULT_VECTOR_WEIGHT,
            merge_method: MergeMethod::default(),
            merge_locally: false,
        }
    }
}

/// Chat grounding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Documents retrieved as context for each chat turn.
    pub context_limit: usize,
    /// Vector weight of the context retrieval.
    pub context_vector_weight: f64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        let policy = ChatContextPolicy::default();
        Self {
            context_limit: policy.limit,
            context_vector_weight: policy.vector_weight,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `$XDG_CONFIG_HOME/govsearch/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("govsearch").join("config.toml")
        } else if let Some(dir) = dirs::config_dir() {
            dir.join("govsearch").join("config.toml")
        } else {
            PathBuf::from("/tmp/govsearch-config/config.toml")
        }
    }

    /// Load `path`, or the default path if it exists, or built-in defaults.
    ///
    /// An explicitly given path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_config_path();
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply [`ENV_API_URL`] / [`ENV_FALLBACK_URL`] from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply endpoint overrides using `lookup` to read variables.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        if let Some(url) = read(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(url) = read(ENV_FALLBACK_URL) {
            self.api.fallback_url = url;
        }
    }

    /// Client configuration for the API section.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            fallback_url: self.api.fallback_url.clone(),
            timeout_seconds: self.api.timeout_seconds,
            probe_timeout_seconds: self.api.probe_timeout_seconds,
            user_agent: self.api.user_agent.clone(),
        }
    }

    /// Search parameters for `query` using the configured defaults.
    pub fn search_params(&self, query: impl Into<String>) -> SearchParams {
        SearchParams::new(query)
            .with_limit(self.search.limit)
            .with_vector_weight(self.search.vector_weight)
            .with_merge_method(self.search.merge_method)
    }

    /// Where hybrid merges run.
    pub fn hybrid_execution(&self) -> HybridExecution {
        if self.search.merge_locally {
            HybridExecution::Client
        } else {
            HybridExecution::Server
        }
    }

    /// Context retrieval policy for chat turns.
    pub fn chat_policy(&self) -> ChatContextPolicy {
        ChatContextPolicy {
            limit: self.chat.context_limit,
            vector_weight: self.chat.context_vector_weight,
            execution: self.hybrid_execution(),
        }
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.client_config()
            .validate()
            .map_err(|e| AppError::Config(format!("[api] {e}")))?;
        if self.search.limit == 0 {
            return Err(AppError::Config("[search] limit must be greater than 0".into()));
        }
        check_weight("[search] vector_weight", self.search.vector_weight)?;
        if self.chat.context_limit == 0 {
            return Err(AppError::Config(
                "[chat] context_limit must be greater than 0".into(),
            ));
        }
        check_weight("[chat] context_vector_weight", self.chat.context_vector_weight)?;
        Ok(())
    }
}

fn check_weight(name: &str, weight: f64) -> Result<()> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "{name} must be within [0, 1], got {weight}"
        )))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.limit, 5);
        assert_eq!(config.chat.context_limit, 3);
        assert!((config.chat.context_vector_weight - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.hybrid_execution(), HybridExecution::Server);
    }

    #[test]
    fn chat_policy_follows_local_merge_setting() {
        let mut config = AppConfig::default();
        assert_eq!(config.chat_policy().execution, HybridExecution::Server);
        config.search.merge_locally = true;
        let policy = config.chat_policy();
        assert_eq!(policy.execution, HybridExecution::Client);
        assert_eq!(policy.limit, 3);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://abc123.execute-api.us-east-1.amazonaws.com/dev"

            [search]
            mode = "knowledge_graph"
            merge_method = "separate"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.fallback_url, DEFAULT_FALLBACK_URL);
        assert_eq!(config.api.probe_timeout_seconds, 3);
        assert_eq!(config.search.mode.explicit(), Some(SearchMode::KnowledgeGraph));
        assert_eq!(config.search.merge_method, MergeMethod::Separate);
        assert_eq!(config.search.limit, 5);
    }

    #[test]
    fn unknown_merge_method_rejected() {
        let result: std::result::Result<AppConfig, _> =
            toml::from_str("[search]\nmerge_method = \"rrf\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_replace_endpoints() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "https://api.example.gov/prod"),
            (ENV_FALLBACK_URL, "  "),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| (*v).to_owned()));
        assert_eq!(config.api.base_url, "https://api.example.gov/prod");
        assert_eq!(config.api.fallback_url, DEFAULT_FALLBACK_URL);
    }

    #[test]
    fn validation_names_bad_field() {
        let mut config = AppConfig::default();
        config.search.vector_weight = 1.2;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("vector_weight"), "{err}");

        let mut config = AppConfig::default();
        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.chat.context_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn search_params_follow_settings() {
        let mut config = AppConfig::default();
        config.search.limit = 8;
        config.search.merge_method = MergeMethod::Interleave;
        let params = config.search_params("housing assistance");
        assert_eq!(params.limit, 8);
        assert_eq!(params.merge_method, MergeMethod::Interleave);
        assert!((params.vector_weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = AppConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("govsearch"));
    }

    #[test]
    fn mode_preference_round_trips_search_mode() {
        for mode in [SearchMode::Vector, SearchMode::KnowledgeGraph, SearchMode::Hybrid] {
            assert_eq!(ModePreference::from(mode).explicit(), Some(mode));
        }
        assert_eq!(ModePreference::Auto.explicit(), None);
    }
}
