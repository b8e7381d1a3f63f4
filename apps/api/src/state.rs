use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::llm_client::GenerationClient;
use crate::outreach::transport::MailTransport;
use crate::pipeline::evaluator::{BatchProgress, EvaluationOptions};
use crate::presets::PresetStore;
use crate::session::SessionState;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One generation client (one credential) for the whole process.
    pub llm: Arc<dyn GenerationClient>,
    pub mailer: Arc<dyn MailTransport>,
    pub presets: Arc<PresetStore>,
    pub session: Arc<RwLock<SessionState>>,
    pub progress: Arc<BatchProgress>,
    pub options: EvaluationOptions,
}

impl AppState {
    pub fn new(
        config: &Config,
        llm: Arc<dyn GenerationClient>,
        mailer: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            llm,
            mailer,
            presets: Arc::new(PresetStore::new(&config.presets_path)),
            session: Arc::new(RwLock::new(SessionState::default())),
            progress: Arc::new(BatchProgress::default()),
            options: EvaluationOptions {
                max_resume_chars: config.max_resume_chars,
                concurrency: config.batch_concurrency,
            },
        }
    }
}
