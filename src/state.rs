use crate::config::AppConfig;
use crate::documents::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use crate::llm::{GeminiClient, GenerativeClient};
use crate::storage::{Storage, StorageClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub llm: Arc<dyn GenerativeClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let documents = match &config.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await?;
                let store = PgDocumentStore::new(db);
                if let Err(e) = store.migrate().await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(store) as Arc<dyn DocumentStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; documents are kept in memory");
                Arc::new(MemoryDocumentStore::new()) as Arc<dyn DocumentStore>
            }
        };

        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;

        let gemini = GeminiClient::new(&config.gemini);
        if !gemini.is_configured() {
            tracing::warn!("GEMINI_API_KEY not set; categorization and recipe generation use fallbacks");
        }
        let llm = Arc::new(gemini) as Arc<dyn GenerativeClient>;

        Ok(Self {
            documents,
            config,
            storage,
            llm,
        })
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        Self::fake_with_llm(Arc::new(crate::llm::testing::ScriptedClient::unconfigured()))
    }

    pub fn fake_with_llm(llm: Arc<dyn GenerativeClient>) -> Self {
        use async_trait::async_trait;
        use bytes::Bytes;

        #[derive(Clone)]
        struct FakeStorage;
        #[async_trait]
        impl StorageClient for FakeStorage {
            async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
                Ok(())
            }
            async fn delete_object(&self, _k: &str) -> anyhow::Result<()> {
                Ok(())
            }
            fn public_url(&self, k: &str) -> String {
                format!("https://fake.local/{}", k)
            }
        }

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            storage: crate::config::StorageConfig {
                endpoint: "fake".into(),
                bucket: "fake".into(),
                access_key: "fake".into(),
                secret_key: "fake".into(),
                region: "us-east-1".into(),
                public_url: "https://fake.local".into(),
            },
            gemini: crate::config::GeminiConfig {
                api_key: String::new(),
                model: "fake".into(),
                base_url: "https://fake.local".into(),
            },
        });

        Self {
            documents: Arc::new(MemoryDocumentStore::new()),
            config,
            storage: Arc::new(FakeStorage),
            llm,
        }
    }
}
