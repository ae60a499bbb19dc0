// Document Layout Engine
// Implements: plan text parsing, font metrics, page geometry, pagination with header/footer.
// Synchronous and CPU-bound: async callers must run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod geometry;
pub mod markdown;
pub mod paginator;

// Re-export the public API consumed by other modules (render, handlers).
pub use geometry::{default_layout_config, LayoutConfig, PaperSize};
pub use markdown::parse_plan;
pub use paginator::{layout_document, LayoutOutput, LayoutWarning};
