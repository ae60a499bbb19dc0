//! Axum route handlers for the Plans API.

use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::{layout_document, parse_plan, LayoutWarning, PaperSize};
use crate::layout::geometry::RowShape;
use crate::layout::paginator::PlacedKind;
use crate::planning::generator::{generate_plan, GeneratedPlan};
use crate::planning::inputs::PlanForm;
use crate::planning::reference::load_reference;
use crate::render::{export_filename, render_plan, Disposition, ExportFormat};
use crate::state::AppState;

/// Lists the kinds of degraded rendering that happened during an export.
pub const LAYOUT_WARNINGS_HEADER: &str = "x-layout-warnings";
pub const PAGE_COUNT_HEADER: &str = "x-page-count";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub plan_text: String,
    /// Running header title. Defaults to the configured institute name.
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BlockSummary {
    pub source_index: usize,
    pub kind: PlacedKind,
    pub top: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<RowShape>,
}

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub number: u32,
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Serialize)]
pub struct LayoutPreviewResponse {
    pub title: String,
    pub paper: PaperSize,
    pub page_count: usize,
    pub pages: Vec<PageSummary>,
    pub warnings: Vec<LayoutWarning>,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub plan_text: String,
    /// Course or subject name; becomes part of the download filename.
    #[serde(default)]
    pub subject: String,
    pub title: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub disposition: Disposition,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/plans
///
/// Multipart form → validated inputs → reference context → one generation call.
/// Validation happens before the PDF is read or the model server is contacted.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GeneratedPlan>, AppError> {
    let form = PlanForm::from_multipart(multipart).await?;
    let inputs = form.validate()?;

    if let Some(upload) = &form.reference_pdf {
        info!(
            filename = upload.filename.as_deref().unwrap_or("<unnamed>"),
            bytes = upload.bytes.len(),
            "Reference PDF uploaded"
        );
    }
    let reference = load_reference(form.reference_pdf.map(|u| u.bytes)).await?;

    let plan = generate_plan(
        state.generator.as_ref(),
        &inputs,
        &reference,
        state.config.generate_timeout,
    )
    .await?;

    Ok(Json(plan))
}

/// POST /api/v1/plans/layout
///
/// Paginates plan text without producing a document: which block landed on which
/// page, and any layout warnings.
pub async fn handle_layout_preview(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<LayoutPreviewResponse>, AppError> {
    require_plan_text(&request.plan_text)?;
    let title = resolve_title(&state, request.title.as_deref());
    let config = state.layout.clone();

    let response = tokio::task::spawn_blocking(move || {
        let blocks = parse_plan(&request.plan_text);
        let output = layout_document(&config, &title, &blocks);
        LayoutPreviewResponse {
            title,
            paper: config.paper,
            page_count: output.pages.len(),
            pages: output
                .pages
                .into_iter()
                .map(|page| PageSummary {
                    number: page.number,
                    blocks: page
                        .blocks
                        .into_iter()
                        .map(|b| BlockSummary {
                            source_index: b.source_index,
                            kind: b.kind,
                            top: b.top,
                            height: b.height,
                            shape: b.shape,
                        })
                        .collect(),
                })
                .collect(),
            warnings: output.warnings,
        }
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in layout preview: {e}")))?;

    Ok(Json(response))
}

/// POST /api/v1/plans/export
///
/// Renders plan text as a download. Degraded rendering still succeeds; the warning
/// kinds are listed in the `x-layout-warnings` header.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    require_plan_text(&request.plan_text)?;
    let title = resolve_title(&state, request.title.as_deref());
    let config = state.layout.clone();
    let format = request.format;
    let plan_text = request.plan_text;

    let rendered = tokio::task::spawn_blocking(move || render_plan(&plan_text, &title, format, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in export render: {e}")))?;

    let seq = state.next_export_seq();
    let filename = export_filename(seq, &request.subject, format);
    info!(
        %filename,
        pages = rendered.page_count,
        bytes = rendered.bytes.len(),
        warnings = rendered.warnings.len(),
        "Plan exported"
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(format.mime_type()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&request.disposition.header_value(&filename))
            .map_err(|e| AppError::Internal(anyhow!("invalid Content-Disposition value: {e}")))?,
    );
    headers.insert(
        HeaderName::from_static(PAGE_COUNT_HEADER),
        HeaderValue::from(rendered.page_count as u64),
    );
    if !rendered.warnings.is_empty() {
        let kinds = warning_kinds(&rendered.warnings);
        warn!(%filename, warnings = %kinds, "Export rendered with layout warnings");
        headers.insert(
            HeaderName::from_static(LAYOUT_WARNINGS_HEADER),
            HeaderValue::from_str(&kinds)
                .map_err(|e| AppError::Internal(anyhow!("invalid warnings header: {e}")))?,
        );
    }

    Ok((headers, rendered.bytes).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_plan_text(plan_text: &str) -> Result<(), AppError> {
    if plan_text.trim().is_empty() {
        return Err(AppError::Validation("plan_text cannot be empty".to_string()));
    }
    Ok(())
}

fn resolve_title(state: &AppState, requested: Option<&str>) -> String {
    requested
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&state.config.institute_name)
        .to_string()
}

/// Distinct warning kinds in first-seen order, comma separated.
fn warning_kinds(warnings: &[LayoutWarning]) -> String {
    let mut kinds: Vec<&str> = Vec::new();
    for w in warnings {
        if !kinds.contains(&w.kind()) {
            kinds.push(w.kind());
        }
    }
    kinds.join(", ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
