//! Merchant lookup REST API
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Liveness probe |
//! | `/api/merchant/:name` | GET | Resolve one merchant through the shared cache |
//! | `/api/search?q=` | GET | Search previously written batch results |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::LookupCache;
use crate::rank::ScoredCandidate;
use crate::report::{MerchantRow, ResultsStore};
use crate::types::ResolvedIdentity;

/// Shared state for the API routes
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<LookupCache>,
    pub results: Arc<ResultsStore>,
}

impl AppState {
    pub fn new(cache: Arc<LookupCache>, results: Arc<ResultsStore>) -> Self {
        Self { cache, results }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MerchantResponse {
    pub name: String,
    pub identity: ResolvedIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<ScoredCandidate>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MerchantQuery {
    /// Include the scored Stage-1 candidates
    #[serde(default)]
    pub candidates: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "merchant not found".to_string(),
        }),
    )
        .into_response()
}

/// Routes without middleware; the server binary adds CORS and tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/merchant/:name", get(get_merchant))
        .route("/api/search", get(search_results))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_merchant(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MerchantQuery>,
) -> Response {
    let name = name.trim().to_string();
    if name.is_empty() {
        return not_found();
    }

    let Some(identity) = state.cache.resolve(&name).await else {
        return not_found();
    };

    let candidates = if query.candidates {
        match state.cache.resolver().candidates(&name).await {
            Ok(scored) => Some(scored),
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Candidate listing failed");
                None
            }
        }
    } else {
        None
    };

    Json(MerchantResponse {
        name,
        identity,
        candidates,
    })
    .into_response()
}

async fn search_results(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<MerchantRow>> {
    Json(
        state
            .results
            .search(query.q.trim())
            .into_iter()
            .cloned()
            .collect(),
    )
}
