use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/diagnostics", get(handlers::health::diagnostics))
        // Mood
        .route("/mood", post(handlers::mood::save_mood))
        .route("/mood/:user_id/:date", get(handlers::mood::get_mood))
        // Meals
        .route("/meals", post(handlers::meals::add_meal))
        .route("/meals/:user_id/:date", get(handlers::meals::get_meals))
        // Hydration
        .route("/hydration", post(handlers::hydration::add_hydration))
        .route(
            "/hydration/:user_id/:date",
            get(handlers::hydration::get_hydration),
        )
        // Stats & achievements
        .route("/stats", post(handlers::stats::save_stats))
        .route("/stats/:user_id", get(handlers::stats::get_stats))
        .route(
            "/achievements",
            post(handlers::achievements::add_achievement),
        )
        .route(
            "/achievements/:user_id",
            get(handlers::achievements::get_achievements),
        );

    let prefix = state.config.service_prefix.trim_matches('/');
    let app = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    };

    app.layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(hv) => Some(hv),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(600))
}

/// Serves the API on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(state)).await
}
