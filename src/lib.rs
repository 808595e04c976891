pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod upstream;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Shared, read-only state handed to the gate and every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}

/// Full router: API routes, 404 fallback, and the edge gate in front of both
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .merge(auth_routes())
        .merge(availability_routes())
        .merge(consultation_request_routes())
        .merge(consultation_routes())
        .merge(consultation_record_routes())
        .merge(medical_record_routes())
        .merge(audit_log_routes())
        .route("/api/communication/token", get(handlers::communication::token))
        .route("/api/proxy", post(handlers::proxy::forward))
        .fallback(handlers::not_found)
        // Global middleware
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::edge_gate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/user", get(auth::user))
        .route("/api/auth/session", get(auth::session_status))
        .route(
            "/api/auth/update-profile",
            axum::routing::put(auth::update_profile).patch(auth::update_profile),
        )
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/reset-password/request", post(auth::reset_password_request))
        .route("/api/auth/reset-password/confirm", post(auth::reset_password_confirm))
}

fn availability_routes() -> Router<AppState> {
    use handlers::availability;

    Router::new()
        .route("/api/availability", get(availability::list).post(availability::create))
        .route(
            "/api/availability/:id",
            get(availability::show)
                .put(availability::update)
                .patch(availability::update)
                .delete(availability::remove),
        )
}

fn consultation_request_routes() -> Router<AppState> {
    use handlers::consultation_requests as requests;

    Router::new()
        .route("/api/consultation-requests", get(requests::list).post(requests::create))
        .route(
            "/api/consultation-requests/:id",
            get(requests::show).patch(requests::update).delete(requests::remove),
        )
        .route("/api/consultation-requests/:id/accept", post(requests::accept))
        .route("/api/consultation-requests/:id/reject", post(requests::reject))
}

fn consultation_routes() -> Router<AppState> {
    use handlers::consultations;

    Router::new()
        .route("/api/consultations", get(consultations::list))
        .route("/api/consultations/:id", get(consultations::show))
        // Lifecycle actions
        .route("/api/consultations/:id/start", post(consultations::start))
        .route("/api/consultations/:id/complete", post(consultations::complete))
        .route("/api/consultations/:id/cancel", post(consultations::cancel))
}

fn consultation_record_routes() -> Router<AppState> {
    use handlers::consultation_records as records;

    Router::new()
        .route("/api/consultation-records", get(records::list))
        .route("/api/consultation-records/:id", get(records::show))
        .route("/api/consultation-records/:id/notes", post(records::add_notes))
        .route("/api/consultation-records/:id/attachments", post(records::upload_attachment))
        .route("/api/consultation-records/:id/complete", post(records::complete))
}

fn medical_record_routes() -> Router<AppState> {
    use handlers::medical_records;

    Router::new()
        .route("/api/medical-records", get(medical_records::list).post(medical_records::create))
        .route(
            "/api/medical-records/:id",
            get(medical_records::show).patch(medical_records::update),
        )
}

fn audit_log_routes() -> Router<AppState> {
    use handlers::audit_logs;

    Router::new()
        .route("/api/audit-logs", get(audit_logs::list))
        .route("/api/audit-logs/:id", get(audit_logs::show))
}

/// Credentialed CORS needs an explicit origin list; a disabled config allows none
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = if security.enable_cors {
        security
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect()
    } else {
        Vec::new()
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
