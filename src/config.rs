use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
    pub admin_password: Option<String>,
    pub openai: OpenAiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("APP_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid port {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),
        };

        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            users_file: get("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("users.json")),
            admin_password: get("ADMIN_PASSWORD"),
            openai,
        })
    }
}
