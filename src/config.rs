use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_COLLECTION: &str = "hotel_pages";
pub const DEFAULT_SEED_URL: &str =
    "https://www.tripadvisor.com/Hotels-g293753-Tunisia-Hotels.html";
pub const DEFAULT_SITE_DOMAIN: &str = "www.tripadvisor.com";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CrawlerConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    pub seed_url: String,
    /// Host whose navigation and profile links the cleaner strips.
    pub site_domain: String,
    pub page_limit: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.firecrawl.dev".to_string(),
            api_key: String::new(),
            seed_url: DEFAULT_SEED_URL.to_string(),
            site_domain: DEFAULT_SITE_DOMAIN.to_string(),
            page_limit: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: String::new(),
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 1024,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SpeechConfig {
    pub program: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// The single front-end origin allowed by CORS.
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = ProjectDirs::from("dev", "voicedesk", "voicedesk")
            .map(|dirs| dirs.cache_dir().to_path_buf());
        Self { cache_dir }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Loads configuration by layering defaults, an optional `voicedesk.toml`
/// (path overridable via `VOICEDESK_CONFIG_PATH`), and `VOICEDESK_`-prefixed
/// environment variables. The conventional service variables (`QDRANT_URL`,
/// `QDRANT_API_KEY`, `FIRECRAWL_API_KEY`, `CLAUDE_API_KEY`) win over
/// everything else when set.
pub fn load_config() -> Result<AppConfig> {
    let config_path_env = std::env::var("VOICEDESK_CONFIG_PATH").ok();
    let config_path = config_path_env
        .clone()
        .unwrap_or_else(|| "voicedesk.toml".to_string());

    if let Some(ref env_path) = config_path_env {
        if !std::path::Path::new(env_path).exists() {
            return Err(anyhow::anyhow!(
                "Config file not found at VOICEDESK_CONFIG_PATH: {}",
                env_path
            ));
        }
        log::info!("VOICEDESK_CONFIG_PATH is set: {}", env_path);
    }

    let figment = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("VOICEDESK_").split("__"));

    let mut config: AppConfig = figment.extract().context("Failed to extract AppConfig")?;
    apply_service_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn apply_service_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = std::env::var("QDRANT_URL") {
        config.qdrant.url = url;
    }
    if let Ok(key) = std::env::var("QDRANT_API_KEY") {
        config.qdrant.api_key = Some(key);
    }
    if let Ok(key) = std::env::var("FIRECRAWL_API_KEY") {
        config.crawler.api_key = key;
    }
    if let Ok(key) = std::env::var("CLAUDE_API_KEY") {
        config.llm.api_key = key;
    }
}

fn validate_config(config: &AppConfig) -> Result<()> {
    if config.qdrant.collection.is_empty() {
        return Err(anyhow::anyhow!("Configured collection name cannot be empty"));
    }
    if config.server.allowed_origin.is_empty() {
        return Err(anyhow::anyhow!("Configured allowed_origin cannot be empty"));
    }
    if config.crawler.page_limit == 0 {
        return Err(anyhow::anyhow!("Configured page_limit must be at least 1"));
    }
    Ok(())
}
