//! Application context shared by the HTTP server and CLI commands.

use std::sync::Arc;

use anyhow::Context as _;

use crate::config::Settings;
use crate::documents::{DocumentRepository, SqliteDocumentStore};
use crate::ingest::Ingestor;
use crate::llm::{self, GenerativeModel};
use crate::qa::AnsweringService;

/// Everything a request needs, built once at startup and passed explicitly.
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn DocumentRepository>,
    pub answering: AnsweringService,
    pub ingestor: Ingestor,
}

impl AppContext {
    /// Open the configured store and build the configured model.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        settings
            .qa
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid [qa] settings: {e}"))?;

        let store = SqliteDocumentStore::open(&settings.storage.database_path).with_context(|| {
            format!(
                "failed to open document store at {}",
                settings.storage.database_path.display()
            )
        })?;
        let model = llm::from_config(&settings.model)?;

        Ok(Self::new(settings, Arc::new(store), model))
    }

    /// Assemble a context from already-built parts.
    pub fn new(
        settings: Settings,
        store: Arc<dyn DocumentRepository>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        let answering = AnsweringService::new(store.clone(), model, settings.qa.clone());
        let ingestor = Ingestor::new(
            settings.storage.upload_dir.clone(),
            settings.storage.write_buffer_bytes,
            store.clone(),
        );

        Self {
            settings: Arc::new(settings),
            store,
            answering,
            ingestor,
        }
    }
}
