// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{generator, profile, quiz},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quiz, profile, generator).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (learning engine).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
        HeaderValue::from_static("http://localhost:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/generate", post(quiz::generate_quiz))
        .route("/evaluate", post(quiz::evaluate_quiz))
        .route("/topics", get(quiz::list_topics));

    let profile_routes = Router::new()
        .route("/{learner_id}", get(profile::get_profile))
        .route("/{learner_id}/performance", get(profile::get_performance));

    let generator_routes = Router::new()
        .route("/health", get(generator::health))
        .route("/info", get(generator::info));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/generator", generator_routes)
        // Global Middleware (applied top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
