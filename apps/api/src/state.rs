use std::sync::Arc;

use crate::autosave::AutoSaver;
use crate::config::Config;
use crate::layout::PageGeometry;
use crate::mailer::EmailClient;
use crate::optimize::ResumeOptimizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable optimizer. Default: the chat-completion backed `LlmResumeOptimizer`.
    pub optimizer: Arc<dyn ResumeOptimizer>,
    pub mailer: EmailClient,
    /// Debounced draft persistence shared by every client of this instance.
    pub autosaver: Arc<AutoSaver>,
    /// Page dimensions for the layout estimator. A4 at 96dpi.
    pub page_geometry: PageGeometry,
}
