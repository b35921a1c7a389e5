use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::get, Json, Router};
use ficrec_core::persist::{load_output_header, OutputPaths};
use ficrec_core::title_search::{Catalogue, CatalogueHit, TitleMatch};
use ficrec_core::{EditConfig, Recommendation, SimilarityReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const MAX_K: usize = 100;
/// Longest `/titles` query accepted, in characters.
const MAX_TITLE_QUERY_CHARS: usize = 256;

#[derive(Deserialize)]
pub struct EpisodeParams {
    #[serde(default)]
    pub title: String,
}

#[derive(Deserialize)]
pub struct TitleParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Deserialize)]
pub struct RecommendationParams {
    pub title: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize { 10 }

fn clamp_k(k: usize) -> usize { k.clamp(1, MAX_K) }

#[derive(Serialize)]
pub struct TitleSearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<TitleMatch>,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub results: Vec<Recommendation>,
}

#[derive(Clone)]
pub struct AppState {
    pub report: Arc<SimilarityReport>,
    pub catalogue: Arc<Catalogue>,
}

pub fn build_app(index_dir: String) -> Result<Router> {
    let (report, catalogue, meta) = load_output_header(&OutputPaths::new(&index_dir))?;
    tracing::info!(
        num_reference_docs = meta.num_reference_docs,
        num_queries = meta.num_queries,
        created_at = %meta.created_at,
        "loaded recommendation output"
    );
    let app_state = AppState { report: Arc::new(report), catalogue: Arc::new(catalogue) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/episodes", get(episodes_handler))
        .route("/titles", get(titles_handler))
        .route("/recommendations", get(recommendations_handler))
        .with_state(app_state)
        .layer(cors);
    Ok(app)
}

pub async fn episodes_handler(State(state): State<AppState>, Query(params): Query<EpisodeParams>) -> Json<Vec<CatalogueHit>> {
    Json(state.catalogue.substring_search(&params.title))
}

pub async fn titles_handler(
    State(state): State<AppState>,
    Query(params): Query<TitleParams>,
) -> Result<Json<TitleSearchResponse>, (StatusCode, Json<serde_json::Value>)> {
    if params.q.chars().count() > MAX_TITLE_QUERY_CHARS {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("query longer than {MAX_TITLE_QUERY_CHARS} characters") })),
        ));
    }
    let start = std::time::Instant::now();
    let cfg = EditConfig { top_k: clamp_k(params.k), ..Default::default() };
    let catalogue = Arc::clone(&state.catalogue);
    let query = params.q.clone();
    // Edit distance is quadratic per alias; keep it off the async workers.
    let results = tokio::task::spawn_blocking(move || catalogue.fuzzy_search(&query, &cfg))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "title search task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "title search failed" })))
        })?;
    Ok(Json(TitleSearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), results }))
}

pub async fn recommendations_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationResponse>, (StatusCode, Json<serde_json::Value>)> {
    match state.report.recommendations_for(&params.title, clamp_k(params.k)) {
        Some(results) => Ok(Json(RecommendationResponse { title: params.title, results })),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "unknown title" })))),
    }
}
