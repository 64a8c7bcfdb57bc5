use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
const DEFAULT_UPLOAD_URL_PREFIX: &str = "/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image-preview";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

/// Runtime settings, read once from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_upload_bytes: usize,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` when `GEMINI_API_KEY` is unset or blank.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = env_parse("PHOTOBOOTH_BIND").unwrap_or_else(default_bind);

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let upload_url_prefix = std::env::var("UPLOAD_URL_PREFIX")
            .map(|prefix| normalize_prefix(&prefix))
            .unwrap_or_else(|_| DEFAULT_UPLOAD_URL_PREFIX.to_string());

        let max_upload_bytes = env_parse("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        let timeout_secs = env_parse("UPSTREAM_TIMEOUT_SECS").unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        Self {
            bind_addr,
            upload_dir,
            upload_url_prefix,
            max_upload_bytes,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(timeout_secs),
            },
        }
    }

    /// Settings for tests and embedding: uploads under `upload_dir`, provider
    /// at `base_url`, everything else at its default.
    pub fn for_dirs(upload_dir: impl Into<PathBuf>, api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            bind_addr: default_bind(),
            upload_dir: upload_dir.into(),
            upload_url_prefix: DEFAULT_UPLOAD_URL_PREFIX.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            gemini: GeminiConfig {
                api_key: api_key.map(str::to_string),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            },
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_UPLOAD_URL_PREFIX.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
