use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::ClothingStore,
    error::AppError,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::WeatherProvider,
};

pub mod clothes;
pub mod weather;

/// Dependencies shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub weather_provider: Arc<dyn WeatherProvider>,
    pub clothing_store: Arc<dyn ClothingStore>,
}

impl AppState {
    pub fn new(
        weather_provider: Arc<dyn WeatherProvider>,
        clothing_store: Arc<dyn ClothingStore>,
    ) -> Self {
        Self {
            weather_provider,
            clothing_store,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/weather", get(weather::get_weather))
        .route("/weather/forecast", get(weather::get_forecast))
        .route("/clothes", get(clothes::list).post(clothes::create))
        .route(
            "/clothes/:id",
            get(clothes::get).put(clothes::update).delete(clothes::delete),
        )
        .with_state(Arc::new(state));

    with_common_layers(routes)
}

/// Router used when required secrets are missing
///
/// Every path and method answers with a configuration error.
pub fn misconfigured_router(missing: &[&str]) -> Router {
    let missing = missing.join(", ");
    let routes = Router::new().fallback(move || {
        let missing = missing.clone();
        async move { AppError::Configuration(format!("missing {}", missing)) }
    });

    with_common_layers(routes)
}

fn with_common_layers(router: Router) -> Router {
    router
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
