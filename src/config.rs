use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_SYSTEM_PROMPT: &str = "Du är en expert på att fylla i mötesmallar baserat på \
transkript. Du ska vara noggrann, tydlig och följa exakt samma struktur som originalmallen. \
Använd svenska och var professionell i tonen.";

pub const DEFAULT_TASK_PROMPT: &str = "Fyll i mallen baserat på transkriptet.";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub transcription: TranscriptionConfig,
    pub llm: LlmConfig,
    pub retry: RetryPolicy,
    pub mock_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Directory with the browser front end, served for unmatched paths
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: String,
    pub max_upload_mb: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Language hint used when a request does not name one
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
    pub task_prompt: String,
}

impl StorageConfig {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Config {
    /// Load defaults, then `path` (any format the `config` crate knows, optional),
    /// then `MEETING_ASSISTANT_*` environment variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MEETING_ASSISTANT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        cfg.apply_legacy_env();

        Ok(cfg)
    }

    /// Configuration built from defaults only
    pub fn defaults() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("service.name", "meeting-assistant")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8080)?
            .set_default("storage.path", "data")?
            .set_default("storage.max_upload_mb", 100)?
            .set_default("transcription.base_url", "https://api.openai.com")?
            .set_default("transcription.model", "whisper-1")?
            .set_default("transcription.language", "sv")?
            .set_default("llm.base_url", "https://api.openai.com")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.temperature", 0.2)?
            .set_default("llm.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("llm.task_prompt", DEFAULT_TASK_PROMPT)?
            .set_default("retry.max_retries", 3)?
            .set_default("retry.base_delay_ms", 1000)?
            .set_default("mock_mode", false)?)
    }

    /// `OPENAI_API_KEY` and `LLM_API_KEY` fill keys left unset
    fn apply_legacy_env(&mut self) {
        let openai = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let llm = std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());

        if self.transcription.api_key.is_none() {
            self.transcription.api_key = openai.clone();
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = llm.or(openai);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_complete() -> Result<()> {
        let cfg = Config::defaults()?;
        assert_eq!(cfg.service.http.port, 8080);
        assert_eq!(cfg.transcription.model, "whisper-1");
        assert_eq!(cfg.transcription.language, "sv");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert_eq!(cfg.storage.max_upload_bytes(), 100 * 1024 * 1024);
        assert!(!cfg.mock_mode);
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "mock_mode = true\n[retry]\nmax_retries = 5\n[llm]\nmodel = \"gpt-4o\""
        )?;

        let cfg = Config::load(&file.path().to_string_lossy())?;
        assert!(cfg.mock_mode);
        assert_eq!(cfg.retry.max_retries, 5);
        assert_eq!(cfg.retry.base_delay_ms, 1000);
        assert_eq!(cfg.llm.model, "gpt-4o");
        Ok(())
    }

    #[test]
    fn huge_upload_limit_saturates() {
        let storage = StorageConfig {
            path: "data".into(),
            max_upload_mb: u64::MAX / 2,
        };
        assert_eq!(storage.max_upload_bytes(), u64::MAX);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let cfg = Config::load("/nonexistent/meeting-assistant")?;
        assert_eq!(cfg.service.name, "meeting-assistant");
        Ok(())
    }
}
