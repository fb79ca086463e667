//! API route definitions.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{self, admin, applications, auth, favourites, jobs};
use super::state::AppState;
use crate::auth::{Role, auth_middleware, require_role};

/// Create the application router.
///
/// Four groups: public, any authenticated user, admin only and candidate
/// only. The role gate runs inside the authentication layer, so it always
/// sees a verified caller.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{job_id}", get(jobs::get_job))
        .with_state(state.clone());

    let authenticated_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .layer(from_fn_with_state(state.tokens.clone(), auth_middleware))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/{job_id}", put(jobs::update_job))
        .route("/jobs/{job_id}", delete(jobs::delete_job))
        .route("/admin/my-jobs", get(admin::my_jobs))
        .route(
            "/admin/jobs/{job_id}/applications",
            get(admin::job_applications),
        )
        .route("/admin/dashboard", get(admin::dashboard))
        .layer(from_fn_with_state(Role::Admin, require_role))
        .layer(from_fn_with_state(state.tokens.clone(), auth_middleware))
        .with_state(state.clone());

    let candidate_routes = Router::new()
        .route("/applications/{job_id}", post(applications::apply))
        .route("/applications/my", get(applications::my_applications))
        .route("/favourites/{job_id}", post(favourites::save))
        .route("/favourites/{job_id}", delete(favourites::remove))
        .route("/favourites/my", get(favourites::my_favourites))
        .layer(from_fn_with_state(Role::Candidate, require_role))
        .layer(from_fn_with_state(state.tokens.clone(), auth_middleware))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .merge(candidate_routes)
        .layer(ServiceBuilder::new().layer(trace_layer).layer(cors))
}

/// Build the CORS layer from the configured origins.
///
/// With no valid origin configured, cross-origin requests are denied.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
    ];

    let origins: Vec<HeaderValue> = state
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, denying all cross-origin requests");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    }
}
