//! TripPlanner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::domain::{ModelChoice, PreferenceMode, RosterPolicy};
use crate::export::ExportFormat;
use crate::llm::LlmError;
use crate::synth::ChapterFailurePolicy;

/// Main TripPlanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Participant roster rules
    pub roster: RosterConfig,

    /// Briefing compilation options
    pub context: ContextConfig,

    /// Travel guide generation
    pub guide: GuideConfig,

    /// Deliverable export
    pub export: ExportConfig,

    /// Destination reference data
    pub reference: ReferenceConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// Explicit path, then `./.tripplanner.yml`, then
    /// `~/.config/tripplanner/tripplanner.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        debug!(?config_path, "Config::load: called");
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Errors are swallowed: a broken config file is reported properly by
    /// `load` once logging exists.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::search_paths(),
        };
        paths
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(&p).ok())
            .and_then(|c| c.log_level)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".tripplanner.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tripplanner").join("tripplanner.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model used for the BASIC tier
    #[serde(rename = "basic-model")]
    pub basic_model: String,

    /// Model used for the ADVANCED tier
    #[serde(rename = "advanced-model")]
    pub advanced_model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per conversation response (None = provider default)
    #[serde(rename = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Per-call timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            basic_model: "gpt-3.5-turbo".to_string(),
            advanced_model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: None,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Model identifier for a tier
    pub fn model_for(&self, choice: ModelChoice) -> &str {
        match choice {
            ModelChoice::Basic => &self.basic_model,
            ModelChoice::Advanced => &self.advanced_model,
        }
    }

    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String, LlmError> {
        debug!(api_key_env = %self.api_key_env, "LlmConfig::get_api_key: called");
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::MissingCredential(self.api_key_env.clone())),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Participant roster rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Whether a participant has one preference or several
    #[serde(rename = "preference-mode")]
    pub preference_mode: PreferenceMode,

    /// Whether the roster is capped at the trip headcount
    pub policy: RosterPolicy,
}

/// Briefing compilation options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Collapse line breaks and control characters in free-text fields
    #[serde(rename = "sanitize-free-text")]
    pub sanitize_free_text: bool,
}

/// Travel guide generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// What to do when a single chapter request fails
    #[serde(rename = "chapter-failure")]
    pub chapter_failure: ChapterFailurePolicy,

    /// Model tier used for guide requests
    pub tier: ModelChoice,

    /// Sampling temperature for guide requests
    pub temperature: f32,

    /// Max tokens per guide request
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            chapter_failure: ChapterFailurePolicy::default(),
            tier: ModelChoice::Advanced,
            temperature: 0.2,
            max_tokens: 256,
        }
    }
}

/// Deliverable export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory deliverables are written to
    pub dir: PathBuf,

    /// Output document format
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("guides"),
            format: ExportFormat::default(),
        }
    }
}

/// Destination reference data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Newline-separated destination list (embedded list when unset)
    #[serde(rename = "destinations-file")]
    pub destinations_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.roster.preference_mode, PreferenceMode::Single);
        assert_eq!(config.roster.policy, RosterPolicy::Cap);
        assert!(!config.context.sanitize_free_text);
        assert_eq!(config.guide.chapter_failure, ChapterFailurePolicy::ErrorBody);
        assert_eq!(config.export.format, ExportFormat::Markdown);
    }

    #[test]
    fn test_model_for_tier() {
        let config = LlmConfig::default();
        assert_eq!(config.model_for(ModelChoice::Basic), "gpt-3.5-turbo");
        assert_eq!(config.model_for(ModelChoice::Advanced), "gpt-4");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  basic-model: gpt-4o-mini
  advanced-model: gpt-4o
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 1024
  timeout-ms: 30000

roster:
  preference-mode: multi
  policy: overflow

context:
  sanitize-free-text: true

guide:
  chapter-failure: abort
  tier: basic
  temperature: 0.7
  max-tokens: 512

export:
  dir: out
  format: json
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model_for(ModelChoice::Advanced), "gpt-4o");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, Some(1024));
        assert_eq!(config.llm.timeout(), Duration::from_secs(30));
        assert_eq!(config.roster.preference_mode, PreferenceMode::Multi);
        assert_eq!(config.roster.policy, RosterPolicy::Overflow);
        assert!(config.context.sanitize_free_text);
        assert_eq!(config.guide.chapter_failure, ChapterFailurePolicy::Abort);
        assert_eq!(config.guide.tier, ModelChoice::Basic);
        assert_eq!(config.guide.max_tokens, 512);
        assert_eq!(config.export.dir, PathBuf::from("out"));
        assert_eq!(config.export.format, ExportFormat::Json);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  advanced-model: gpt-4-turbo
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.advanced_model, "gpt-4-turbo");
        assert_eq!(config.llm.basic_model, "gpt-3.5-turbo");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.guide.max_tokens, 256);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tp.yml");
        fs::write(&path, "log-level: warn\nexport:\n  dir: /tmp/guides\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.export.dir, PathBuf::from("/tmp/guides"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/tripplanner.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    #[serial]
    fn test_get_api_key() {
        let config = LlmConfig {
            api_key_env: "TP_TEST_API_KEY".to_string(),
            ..Default::default()
        };

        // SAFETY: serialized test, no other thread reads this variable
        unsafe { std::env::remove_var("TP_TEST_API_KEY") };
        assert!(matches!(config.get_api_key(), Err(LlmError::MissingCredential(_))));

        unsafe { std::env::set_var("TP_TEST_API_KEY", "sk-test") };
        assert_eq!(config.get_api_key().unwrap(), "sk-test");

        unsafe { std::env::remove_var("TP_TEST_API_KEY") };
    }
}
