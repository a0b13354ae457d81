use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Accounts and sessions
    let account_routes = Router::new()
        .route("/api/signup/musicians", post(handlers::login::signup_musician))
        .route("/api/signup/groups", post(handlers::login::signup_group))
        .route("/api/login/musicians", post(handlers::login::login_musician))
        .route("/api/login/groups", post(handlers::login::login_group))
        .route(
            "/api/logout/musicians/current",
            delete(handlers::login::logout_musician),
        )
        .route(
            "/api/logout/groups/current",
            delete(handlers::login::logout_group),
        )
        .route(
            "/api/sessions/current",
            get(handlers::login::current_session),
        );

    // Profiles, announcements, demos and membership requests
    // Write access is enforced by the account guards each handler extracts
    let resource_routes = Router::new()
        .route(
            "/api/musicians",
            get(handlers::musicians::list_musicians).post(handlers::musicians::create_musician),
        )
        .route(
            "/api/musicians/:id",
            get(handlers::musicians::get_musician)
                .put(handlers::musicians::update_musician)
                .delete(handlers::musicians::delete_musician),
        )
        .route(
            "/api/groups",
            get(handlers::groups::list_groups).post(handlers::groups::create_group),
        )
        .route(
            "/api/groups/:id",
            get(handlers::groups::get_group)
                .put(handlers::groups::update_group)
                .delete(handlers::groups::delete_group),
        )
        .route(
            "/api/announcements",
            get(handlers::announcements::list_announcements)
                .post(handlers::announcements::create_announcement),
        )
        .route(
            "/api/announcements/:id",
            get(handlers::announcements::get_announcement)
                .put(handlers::announcements::update_announcement)
                .delete(handlers::announcements::delete_announcement),
        )
        .route(
            "/api/demos",
            get(handlers::demos::list_demos).post(handlers::demos::create_demo),
        )
        .route(
            "/api/demos/:id",
            get(handlers::demos::get_demo)
                .put(handlers::demos::update_demo)
                .delete(handlers::demos::delete_demo),
        )
        .route(
            "/api/membershipRequests",
            get(handlers::membership_requests::list_membership_requests)
                .post(handlers::membership_requests::create_membership_request),
        )
        .route(
            "/api/membershipRequests/:id",
            get(handlers::membership_requests::get_membership_request)
                .delete(handlers::membership_requests::delete_membership_request),
        );

    // Uploads get a larger body limit than JSON requests
    let upload_routes = Router::new()
        .route("/api/media/images", post(handlers::media::upload_image))
        .route("/api/media/demos", post(handlers::media::upload_demo))
        .layer(DefaultBodyLimit::max(state.config.media.max_upload_bytes));

    // Probes and metrics (no session needed)
    let ops_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics_handler));

    // Uploaded media and the single-page front end; unknown paths get index.html
    let public_dir = Path::new(&state.config.media.public_dir);
    let spa = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));
    let media = ServeDir::new(&state.config.media.media_dir);

    // The session cookie is only resolved for API calls
    let api_routes = Router::new()
        .merge(account_routes)
        .merge(resource_routes)
        .merge(upload_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(api_routes)
        .merge(ops_routes)
        .nest_service("/media", media)
        .fallback_service(spa)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
