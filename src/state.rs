use crate::config::AppConfig;
use crate::llm::{OpenAiClient, TextGenerator};
use crate::storage::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserStore,
    /// `None` when no AI credential is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let users = UserStore::new(config.users_file.clone());

        let generator = match config.openai.api_key.clone() {
            Some(key) => {
                Some(Arc::new(OpenAiClient::new(key, &config.openai)?) as Arc<dyn TextGenerator>)
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not set; plan generation is disabled");
                None
            }
        };
        if config.admin_password.is_none() {
            tracing::warn!("ADMIN_PASSWORD not set; admin endpoints will fail");
        }

        Ok(Self::from_parts(config, users, generator))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: UserStore,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            config,
            users,
            generator,
        }
    }

    /// State over `users_file` with admin password `admin-secret` and a
    /// generator that echoes the segment it was asked about.
    #[cfg(test)]
    pub fn fake(users_file: std::path::PathBuf) -> Self {
        use crate::llm::LlmError;
        use axum::async_trait;

        struct FakeGenerator;
        #[async_trait]
        impl TextGenerator for FakeGenerator {
            async fn complete(&self, _system: &str, prompt: &str) -> Result<Option<String>, LlmError> {
                let segment = prompt
                    .lines()
                    .find_map(|l| l.strip_prefix("Negócio / Nicho: "))
                    .unwrap_or_default();
                Ok(Some(format!("Plano de 30 dias para {segment}")))
            }
        }

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            users_file: users_file.clone(),
            admin_password: Some("admin-secret".into()),
            openai: crate::config::OpenAiConfig {
                api_key: Some("test".into()),
                model: "gpt-4o-mini".into(),
                base_url: "http://fake.local/v1".into(),
            },
        });

        Self::from_parts(
            config,
            UserStore::new(users_file),
            Some(Arc::new(FakeGenerator) as Arc<dyn TextGenerator>),
        )
    }
}
