use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::layout::{default_layout_config, LayoutConfig};
use crate::llm_client::PlanGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable plan generator. Default: `LlmClient` against Ollama.
    pub generator: Arc<dyn PlanGenerator>,
    pub config: Config,
    /// Page geometry for every render, built once from `config.paper_size`.
    pub layout: LayoutConfig,
    /// Per-process export counter used in download filenames.
    export_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(generator: Arc<dyn PlanGenerator>, config: Config) -> Self {
        let layout = default_layout_config(config.paper_size);
        Self {
            generator,
            config,
            layout,
            export_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Next export sequence number, starting at 1.
    pub fn next_export_seq(&self) -> u64 {
        self.export_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}
