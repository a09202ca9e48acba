use crate::handlers::{claims, providers};
use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/claims", post(claims::create_claim))
        .route("/claims/{id}", get(claims::get_claim))
        .route("/top-providers", get(providers::top_providers))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "claims-gateway",
        claims_stored: state.store.len(),
    })
}
