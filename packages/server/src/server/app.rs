//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::domains::directory::{Business, Service};
use crate::domains::tips::Tip;
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    attendance_handler, cancel_event_handler, cancel_registration_handler,
    complete_event_handler, create_event_handler, health_handler, like_tip_handler,
    publish_event_handler, reconcile_event_handler, register_handler, submission_routes,
    unlike_tip_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, jwt_service: Arc<JwtService>) -> Router {
    let app_state = AppState { deps };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let tip_routes = submission_routes::<Tip>()
        .route("/:id/like", post(like_tip_handler).delete(unlike_tip_handler));

    let event_routes = Router::new()
        .route("/", post(create_event_handler))
        .route("/:id/publish", post(publish_event_handler))
        .route("/:id/cancel", post(cancel_event_handler))
        .route("/:id/complete", post(complete_event_handler))
        .route("/:id/reconcile", post(reconcile_event_handler))
        .route(
            "/:id/registrations",
            post(register_handler).delete(cancel_registration_handler),
        );

    let api = Router::new()
        .nest("/businesses", submission_routes::<Business>())
        .nest("/services", submission_routes::<Service>())
        .nest("/tips", tip_routes)
        .nest("/events", event_routes)
        .route("/registrations/:id/attendance", post(attendance_handler))
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }));

    Router::new()
        .nest("/api", api)
        // Health check (no auth)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
}
