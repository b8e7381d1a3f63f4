use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    /// Hard character cap applied to résumé text before fact extraction.
    pub max_resume_chars: usize,
    /// Candidates evaluated in parallel. 1 keeps the batch strictly sequential.
    pub batch_concurrency: usize,
    pub presets_path: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub max_upload_mb: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", crate::llm_client::DEFAULT_MODEL),
            gemini_base_url: env_or("GEMINI_BASE_URL", crate::llm_client::DEFAULT_BASE_URL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            max_resume_chars: parse_env("MAX_RESUME_CHARS", 30_000)?,
            batch_concurrency: parse_env::<usize>("BATCH_CONCURRENCY", 1)?.max(1),
            presets_path: env_or("PRESETS_PATH", "job_presets.json"),
            smtp_host: env_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parse_env("SMTP_PORT", 587)?,
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 25)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
