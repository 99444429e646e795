use std::sync::Arc;

use crate::config::Config;
use crate::imaging::convert::DocumentConverter;
use crate::imaging::pdf::PageRasterizer;
use crate::llm_client::ChatBackend;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds only configuration and stateless clients; nothing request-scoped
/// lives here.
#[derive(Clone)]
pub struct AppState {
    /// Default: `LlmClient` against Azure OpenAI.
    pub llm: Arc<dyn ChatBackend>,
    /// Default: `PdfiumRasterizer`.
    pub rasterizer: Arc<dyn PageRasterizer>,
    /// Default: `LibreOfficeConverter` (headless soffice).
    pub converter: Arc<dyn DocumentConverter>,
    pub config: Config,
}
