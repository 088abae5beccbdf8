use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunk::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::error::{RecoError, Result};
use crate::minilm_embed::DEFAULT_MODEL_NAME;
use crate::openai::{
    OpenAiSettings, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
use crate::qa::{QaSettings, DEFAULT_RETRIEVAL_K};
use crate::recommend::DEFAULT_TOP_N;

pub const DEFAULT_CONFIG_FILE: &str = "reco.toml";
pub const DEFAULT_EMPLOYEES_PATH: &str = "data/employe.json";
pub const DEFAULT_TRAININGS_PATH: &str = "data/formation.json";
pub const DEFAULT_SUGGESTIONS_PATH: &str = "data/suggestions.json";
pub const DEFAULT_HASH_DIM: usize = 768;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    Hash,
    #[serde(rename = "minilm")]
    MiniLm,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub employees: PathBuf,
    pub trainings: PathBuf,
    pub suggestions: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            employees: DEFAULT_EMPLOYEES_PATH.into(),
            trainings: DEFAULT_TRAININGS_PATH.into(),
            suggestions: DEFAULT_SUGGESTIONS_PATH.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniLmConfig {
    pub model_name: String,
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub config_path: PathBuf,
}

impl Default for MiniLmConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_path: format!("models/{DEFAULT_MODEL_NAME}.safetensors").into(),
            tokenizer_path: format!("models/{DEFAULT_MODEL_NAME}-tokenizer.json").into(),
            config_path: format!("models/{DEFAULT_MODEL_NAME}-config.json").into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub embedder: EmbedderKind,
    pub top_n: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::MiniLm,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    pub embedder: EmbedderKind,
    pub retrieval_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::OpenAi,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl QaConfig {
    pub fn settings(&self) -> QaSettings {
        QaSettings {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            retrieval_k: self.retrieval_k,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub embedding_batch_size: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }
}

impl OpenAiConfig {
    /// Key and base URL fall back to `OPENAI_API_KEY` / `OPENAI_BASE_URL`.
    pub fn resolve(&self) -> Result<OpenAiSettings> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                RecoError::Configuration(format!(
                    "no OpenAI API key: set {API_KEY_ENV} or openai.api_key"
                ))
            })?;
        let base_url = self
            .base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAiSettings {
            base_url,
            api_key,
            chat_model: self.chat_model.clone(),
            embedding_model: self.embedding_model.clone(),
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
            embedding_batch_size: self.embedding_batch_size,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub hash_dim: usize,
    pub minilm: MiniLmConfig,
    pub recommend: RecommendConfig,
    pub qa: QaConfig,
    pub openai: OpenAiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            hash_dim: DEFAULT_HASH_DIM,
            minilm: MiniLmConfig::default(),
            recommend: RecommendConfig::default(),
            qa: QaConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl AppConfig {
    /// An explicit path must exist. Without one, `reco.toml` in the working
    /// directory is used when present, built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) if !p.exists() => {
                return Err(RecoError::Configuration(format!(
                    "config file not found: {}",
                    p.display()
                )))
            }
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml(&contents)
            .map_err(|e| RecoError::Configuration(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| RecoError::Configuration(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.recommend.top_n == 0 {
            return Err(RecoError::Configuration(
                "recommend.top_n must be at least 1".to_string(),
            ));
        }
        if self.qa.retrieval_k == 0 {
            return Err(RecoError::Configuration(
                "qa.retrieval_k must be at least 1".to_string(),
            ));
        }
        if self.qa.chunk_size == 0 || self.qa.chunk_overlap >= self.qa.chunk_size {
            return Err(RecoError::Configuration(format!(
                "qa.chunk_overlap ({}) must be smaller than qa.chunk_size ({})",
                self.qa.chunk_overlap, self.qa.chunk_size
            )));
        }
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(RecoError::Configuration(format!(
                "openai.temperature must be within [0, 2], got {}",
                self.openai.temperature
            )));
        }
        if self.openai.embedding_batch_size == 0 {
            return Err(RecoError::Configuration(
                "openai.embedding_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
