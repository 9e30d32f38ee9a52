//! HTTP request handlers for the parlbot API.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::query::{build_context, Context};
use crate::storage::StatsSource;
use crate::types::TableCounts;

use super::AppState;

/// Build the axum router with all routes
pub(super) fn router(state: Arc<AppState>) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    axum::Router::new()
        .route("/ask", post(ask))
        .route("/status", get(status))
        .route("/reload", post(reload))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Map anyhow errors to HTTP 500 responses
fn internal_error(err: anyhow::Error) -> ApiError {
    tracing::error!("Internal error: {:#}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

fn bad_request(msg: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
}

// -- /ask --

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default, alias = "message")]
    question: Option<String>,
    /// Return the grounding context without calling the answering model
    #[serde(default)]
    context_only: bool,
}

#[derive(Serialize)]
struct AskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(flatten)]
    context: Context,
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = req.question.unwrap_or_default();
    if question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }

    let started = Instant::now();
    let extractor = state.extractor();
    let max_rows = state.config.context.max_rows;
    let blocking_state = Arc::clone(&state);
    let context = tokio::task::spawn_blocking(move || {
        build_context(
            &extractor,
            || blocking_state.open_store(),
            &question,
            max_rows,
        )
    })
    .await
    .map_err(|e| internal_error(e.into()))?;

    if let Some(fault) = context.fault() {
        tracing::warn!(
            question = %context.question,
            "Answering without data after storage fault: {}",
            fault
        );
    }

    let (answer, called_model) = if req.context_only {
        (None, false)
    } else {
        let answer = state.answerer.answer(&context).await;
        (Some(answer.text), answer.called_model)
    };

    let event = crate::metrics::event(
        "http",
        &context,
        called_model,
        started.elapsed().as_millis() as u64,
    );
    let root = state.root.clone();
    if let Err(e) =
        tokio::task::spawn_blocking(move || crate::metrics::emit(&root, &event)).await
    {
        tracing::warn!("Failed to record question: {}", e);
    }

    Ok(Json(AskResponse { answer, context }))
}

// -- /status --

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tables: Option<TableCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    lexicon: LexiconStats,
    model: String,
}

#[derive(Serialize)]
struct LexiconStats {
    members: usize,
    parties: usize,
    aliases: usize,
}

impl LexiconStats {
    fn of(extractor: &crate::query::Extractor) -> Self {
        Self {
            members: extractor.member_count(),
            parties: extractor.parties().len(),
            aliases: extractor.aliases().len(),
        }
    }
}

async fn status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let blocking_state = Arc::clone(&state);
    let counts = tokio::task::spawn_blocking(move || {
        blocking_state
            .open_store()
            .and_then(|store| store.table_counts())
    })
    .await
    .map_err(|e| internal_error(e.into()))?;

    let (status, tables, error) = match counts {
        Ok(counts) => ("ok", Some(counts), None),
        Err(e) => ("degraded", None, Some(format!("{e:#}"))),
    };

    Ok(Json(StatusResponse {
        status: status.to_string(),
        tables,
        error,
        lexicon: LexiconStats::of(&state.extractor()),
        model: state.answerer.model().to_string(),
    }))
}

// -- /reload --

#[derive(Serialize)]
struct ReloadResponse {
    status: String,
    lexicon: LexiconStats,
}

async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    let blocking_state = Arc::clone(&state);
    let reloaded = tokio::task::spawn_blocking(move || blocking_state.reload())
        .await
        .map_err(|e| internal_error(e.into()))?;

    match reloaded {
        Ok(extractor) => {
            tracing::info!(members = extractor.member_count(), "Lexicon reloaded");
            Ok(Json(ReloadResponse {
                status: "reloaded".to_string(),
                lexicon: LexiconStats::of(&extractor),
            }))
        }
        Err(e) => {
            tracing::warn!("Lexicon reload failed, keeping current lexicon: {:#}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody {
                    error: format!("Reload failed: {e:#}"),
                }),
            ))
        }
    }
}

// -- /health --

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
