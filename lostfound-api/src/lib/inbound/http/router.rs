use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::header;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware::from_fn_with_state;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::dashboards::admin_dashboard;
use super::handlers::dashboards::profile;
use super::handlers::dashboards::user_dashboard;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::rotate_signing_key::rotate_signing_key;
use super::handlers::route_not_found;
use super::handlers::signup::signup;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use super::middleware::require_role;
use super::middleware::RoleGuard;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub authenticator: Arc<Authenticator>,
}

/// Build the HTTP application.
///
/// Every route outside `/auth` sits behind [`authenticate`], then behind the
/// role guard of its group.
pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        user_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login));

    let admin_routes = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", delete(delete_user))
        .route("/dashboard/admin", get(admin_dashboard))
        .route("/admin/signing-keys/rotate", post(rotate_signing_key))
        .route_layer(from_fn_with_state(RoleGuard::admin(), require_role));

    // Ownership of `:user_id` is checked in the handlers.
    let member_routes = Router::new()
        .route("/users/:user_id", get(get_user).put(update_user))
        .route("/dashboard/user", get(user_dashboard))
        .route_layer(from_fn_with_state(RoleGuard::any(), require_role));

    let user_routes = Router::new()
        .route("/profile", get(profile))
        .route_layer(from_fn_with_state(RoleGuard::user(), require_role));

    let protected_routes = Router::new()
        .merge(admin_routes)
        .merge(member_routes)
        .merge(user_routes)
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    // Headers stay out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(ServiceBuilder::new().layer(trace_layer).layer(cors_layer))
        .with_state(state)
}
