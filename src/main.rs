mod aggregate;
mod categories;
mod clients;
mod config;
mod net;
mod places;
mod planner;
mod refine;
mod route;
mod route_geo;
mod sampler;
mod types;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use clients::AppState;
use config::Config;
use net::response::{ResponseError, Result};
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use types::dto::search::{SearchParams, SearchResponse};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(&config)?);

    let app = Router::new()
        .route("/search", get(search_query).post(search_json))
        .route("/categories", get(list_categories))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("Running on {}", config.bind_addr);

    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn search_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    search(&state, params).await
}

#[axum::debug_handler]
async fn search_json(
    State(state): State<Arc<AppState>>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SearchResponse>> {
    search(&state, params).await
}

#[instrument(skip(state))]
async fn search(state: &AppState, params: SearchParams) -> Result<Json<SearchResponse>> {
    let origin = params.origin.trim();
    let destination = params.destination.trim();
    if origin.is_empty() || destination.is_empty() {
        return Err(ResponseError::bad_request(
            "origin and destination are required",
        ));
    }
    let outcome = state.planner.plan(origin, destination).await;
    let response = SearchResponse::from_outcome(outcome, &params.refinement())?;
    info!(results = response.results.len(), "Search done");
    Ok(Json(response))
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(
        state
            .planner
            .allowed_categories()
            .iter()
            .map(String::from)
            .collect(),
    )
}
