pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, optional_auth_middleware, require_admin, require_instructor};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the full router with global middleware applied.
pub fn app(state: AppState) -> Router {
    let api = &config::config().api;

    let mut router = Router::new()
        .merge(public_routes())
        .merge(optional_session_routes())
        .merge(session_routes())
        .merge(instructor_routes())
        .merge(admin_routes())
        .layer(RequestBodyLimitLayer::new(api.max_request_size_bytes))
        .layer(cors_layer(&config::config().security.cors_origins));

    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
        .route("/api/courses", get(public::catalog::list_courses))
        .route("/api/courses/:id", get(public::catalog::get_course))
        .route("/api/categories", get(public::catalog::list_categories))
        .route("/api/reviews", get(public::community::list_reviews))
        .route("/api/discussions", get(public::community::list_discussions))
        .route("/api/replies", get(public::community::list_replies))
}

fn optional_session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/enrollments/check", get(public::enrollment::check))
        .route_layer(from_fn(optional_auth_middleware))
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route(
            "/api/enrollments",
            get(protected::enrollments::list).post(protected::enrollments::enroll),
        )
        .route("/api/enrollments/:id", delete(protected::enrollments::cancel))
        .route(
            "/api/progress",
            get(protected::progress::list).post(protected::progress::record),
        )
        .route("/api/reviews", post(protected::reviews::submit))
        .route("/api/discussions", post(protected::discussions::create))
        .route("/api/replies", post(protected::discussions::reply))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn instructor_routes() -> Router<AppState> {
    // The last route_layer runs first: session, then role.
    Router::new()
        .route("/api/courses", post(protected::catalog::create_course))
        .route("/api/categories", post(protected::catalog::create_category))
        .route_layer(from_fn(require_instructor))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(elevated::admin::stats))
        .route("/api/admin/activity", get(elevated::admin::activity))
        .route(
            "/api/admin/courses",
            get(elevated::admin::list_courses).post(elevated::admin::create_course),
        )
        .route(
            "/api/admin/courses/:id",
            patch(elevated::admin::update_course).delete(elevated::admin::delete_course),
        )
        .route("/api/admin/instructors", get(elevated::admin::instructors))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn(jwt_auth_middleware))
}

/// `*` allows any origin; otherwise only the listed origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}
