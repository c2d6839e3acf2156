//! Runtime configuration
//!
//! ## Configuration Resolution
//!
//! 1. Embedded defaults (`config/finai.toml`, compiled into binary)
//! 2. Override file: an explicit path, else `~/.config/finai/finai.toml`
//!    if it exists. Only the keys it sets are replaced.
//! 3. Environment: `OPENROUTER_API_URL`, `OPENROUTER_API_KEY`,
//!    `FINAI_MODEL`, `FINAI_LLM_BACKEND`
//!
//! The API key only ever comes from the environment.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::orchestrator::EnrichPolicy;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/finai.toml");

pub const ENV_API_URL: &str = "OPENROUTER_API_URL";
pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_MODEL: &str = "FINAI_MODEL";
pub const ENV_BACKEND: &str = "FINAI_LLM_BACKEND";

/// Which chat backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    OpenaiCompatible,
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenaiCompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai_compatible" | "openai" | "openrouter" => Ok(Self::OpenaiCompatible),
            "mock" => Ok(Self::Mock),
            other => Err(Error::Config(format!("Unknown LLM backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub backend: BackendKind,
    /// Full chat-completions endpoint URL
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::OpenaiCompatible,
            api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            max_tokens: 300,
            temperature: 0.2,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub enrich: EnrichPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
}

/// Override file layout: every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    llm: Option<RawLlm>,
    extraction: Option<RawExtraction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLlm {
    backend: Option<BackendKind>,
    api_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtraction {
    enrich: Option<EnrichPolicy>,
}

impl Config {
    /// Resolve the full configuration from defaults, file and process env
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_files(explicit_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus file override, without touching the environment
    pub fn from_files(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::embedded()?;

        let path = match explicit_path {
            Some(p) if !p.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )))
            }
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading config override");
            let content = fs::read_to_string(&path)?;
            config.merge_toml(&content)?;
        }

        Ok(config)
    }

    /// The compiled-in defaults
    pub fn embedded() -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(DEFAULT_CONFIG)?;
        Ok(config)
    }

    /// Overlay the keys present in a TOML document
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)?;

        if let Some(llm) = raw.llm {
            if let Some(backend) = llm.backend {
                self.llm.backend = backend;
            }
            if let Some(url) = llm.api_url {
                self.llm.api_url = url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout) = llm.timeout_secs {
                self.llm.timeout_secs = timeout;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
        }

        if let Some(enrich) = raw.extraction.and_then(|e| e.enrich) {
            self.extraction.enrich = enrich;
        }

        Ok(())
    }

    /// Apply environment overrides through `lookup` (empty values are ignored)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.llm.api_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(backend) = get(ENV_BACKEND) {
            self.llm.backend = backend.parse()?;
        }
        self.llm.api_key = get(ENV_API_KEY);

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("finai").join("finai.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.llm.backend, BackendKind::OpenaiCompatible);
        assert_eq!(
            config.llm.api_url,
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout(), Duration::from_secs(30));
        assert_eq!(config.llm.max_tokens, 300);
        assert!((config.llm.temperature - 0.2).abs() < 1e-6);
        assert_eq!(config.extraction.enrich, EnrichPolicy::WhenAmbiguous);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_merge_only_replaces_given_keys() {
        let mut config = Config::embedded().unwrap();
        config
            .merge_toml("[llm]\nmodel = \"llama-3.1-8b\"\n\n[extraction]\nenrich = \"never\"\n")
            .unwrap();

        assert_eq!(config.llm.model, "llama-3.1-8b");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.extraction.enrich, EnrichPolicy::Never);
    }

    #[test]
    fn test_merge_rejects_unknown_keys() {
        let mut config = Config::embedded().unwrap();
        let err = config.merge_toml("[llm]\napi_key = \"sk-secret\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("finai.toml");
        std::fs::write(&path, "[llm]\nbackend = \"mock\"\ntimeout_secs = 5\n").unwrap();

        let config = Config::from_files(Some(&path)).unwrap();
        assert_eq!(config.llm.backend, BackendKind::Mock);
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_explicit_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = Config::from_files(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://127.0.0.1:9/v1/chat/completions"),
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL, "   "),
            (ENV_BACKEND, "mock"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::embedded().unwrap();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_url, "http://127.0.0.1:9/v1/chat/completions");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        // Blank values do not override
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.backend, BackendKind::Mock);
    }

    #[test]
    fn test_env_bad_backend() {
        let mut config = Config::embedded().unwrap();
        let err = config
            .apply_env(|k| (k == ENV_BACKEND).then(|| "carrier-pigeon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::embedded().unwrap();
        config.llm.api_key = Some("sk-secret".to_string());
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("sk-secret"));
    }
}
