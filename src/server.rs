//! HTTP surface.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod detect;
pub mod error;
pub mod health;
pub mod speech;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Room left for multipart framing on top of the largest accepted upload.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

pub fn cors_layer(origins: Option<Vec<String>>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin `{o}`");
                        None
                    }
                })
                .collect();
            layer.allow_origin(origins)
        }
    }
}

/// Builds the application router. Auth and contact routes exist only when
/// `state` carries a token issuer.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(BODY_LIMIT_SLACK);

    let mut app = Router::new()
        .route("/health", get(health::health))
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/{name}", get(accounts::fetch_account))
        .route("/detect", post(detect::detect))
        .route("/tts", post(speech::tts))
        .route("/stt", post(speech::stt));

    if state.auth_enabled() {
        app = app
            .route("/auth/signup", post(auth::signup))
            .route("/auth/login", post(auth::login))
            .route("/contacts/me", get(auth::get_contact).put(auth::set_contact));
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
