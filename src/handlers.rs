use crate::config::Config;
use crate::errors::AppError;
use crate::extract::CompanyNameExtractor;
use crate::mailbox::{parse_emails, MailboxService};
use crate::models::*;
use crate::render::render_markdown;
use crate::report_store::ReportStore;
use crate::research::ResearchEngine;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use moka::future::Cache;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Process-lifetime report store.
    pub report_store: ReportStore,
    /// Search response cache (1 hour TTL) to reduce external API calls.
    /// Key: search query, Value: checksummed JSON entry.
    pub search_cache: Cache<String, String>,
}

impl AppState {
    fn research_engine(&self) -> ResearchEngine {
        ResearchEngine::new(
            &self.config,
            self.search_cache.clone(),
            self.report_store.clone(),
        )
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "email-research-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to the Email Research API"
    }))
}

/// POST /connect/
///
/// Attempts a mailbox login and reports the outcome. A failed login is a
/// `success=false` payload, never an HTTP error.
pub async fn connect_mailbox(State(state): State<Arc<AppState>>) -> Json<ConnectResponse> {
    tracing::info!("Starting mailbox connection attempt");

    let mailbox = MailboxService::new(&state.config);
    let (success, message) = mailbox.connect().await;

    tracing::info!("Mailbox connection status: {}", message);
    Json(ConnectResponse { success, message })
}

/// GET /fetch/
///
/// Fetches and parses unread mail. Connection failures are recovered as an
/// empty list.
pub async fn fetch_unread(State(state): State<Arc<AppState>>) -> Json<FetchEmailsResponse> {
    tracing::info!("Fetching unread emails");

    let mailbox = MailboxService::new(&state.config);
    let emails = match mailbox.fetch_unread().await {
        Ok(raw) => parse_emails(raw),
        Err(e) => {
            tracing::error!("Unread fetch failed, returning empty list: {}", e);
            Vec::new()
        }
    };

    tracing::info!("Fetched {} unread emails", emails.len());
    Json(FetchEmailsResponse { emails })
}

/// POST /research/
///
/// Researches a single company. Pipeline failure surfaces as an explicit
/// 404 "Research failed" rather than a generic server error.
pub async fn research(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResearchRequest>,
) -> Result<Json<ResearchReport>, AppError> {
    tracing::info!("POST /research/ - company: {}", request.company_name);

    let company_name = request.company_name.trim();
    if company_name.is_empty() {
        return Err(AppError::BadRequest("company_name cannot be empty".to_string()));
    }

    let engine = state.research_engine();
    let breaker = crate::circuit_breaker::create_research_circuit_breaker();

    match engine.research_company(&breaker, company_name).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!("Research failed for '{}': {}", company_name, e);
            Err(AppError::NotFound("Research failed".to_string()))
        }
    }
}

/// GET /report/:id
///
/// Returns the stored report plus its Markdown rendering. Unknown ids are an
/// explicit 404, never a panic or 500.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> Result<Json<ReportResponse>, AppError> {
    tracing::info!("GET /report/{}", report_id);

    let report = state
        .report_store
        .get(&report_id)
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    let markdown_report = render_markdown(&report);

    Ok(Json(ReportResponse {
        json_report: report,
        markdown_report,
    }))
}

/// POST /orchestrate/orchestrate/
///
/// Full pipeline: fetch unread mail, extract candidate company names,
/// research each sequentially. Always returns a (possibly empty or partial)
/// list; per-company failures are logged and omitted.
pub async fn orchestrate(State(state): State<Arc<AppState>>) -> Json<Vec<ResearchReport>> {
    tracing::info!("Starting orchestration run");

    let mailbox = MailboxService::new(&state.config);
    let raw_emails = match mailbox.fetch_unread().await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Unread fetch failed, orchestrating over empty batch: {}", e);
            Vec::new()
        }
    };
    tracing::info!("Orchestration fetched {} unread emails", raw_emails.len());

    let extractor = CompanyNameExtractor::heuristic();
    let company_names = extractor.extract(&raw_emails);
    tracing::info!("Extracted {} candidate company names", company_names.len());

    let engine = state.research_engine();
    let reports = engine.research_all(&company_names).await;

    tracing::info!(
        "Orchestration completed: {} reports from {} candidates, {} stored in total",
        reports.len(),
        company_names.len(),
        state.report_store.len()
    );
    Json(reports)
}
