//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domains::auth::JwtService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{cast_admin, casts, events, health_handler, public, users};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: Arc<JwtService>,
    pub signup_enabled: bool,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // No configured origins: allow any (development)
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

fn cast_routes() -> Router {
    Router::new()
        .route("/casts", post(casts::create_cast_handler))
        .route("/casts/:slug", get(casts::cast_home_handler))
        .route("/casts/:slug/members", get(casts::roster_handler))
        .route("/casts/:slug/events", get(casts::cast_events_handler))
        .route("/casts/:slug/join", post(casts::join_handler))
        .route("/casts/:slug/leave", post(casts::leave_handler))
        .route("/casts/:slug/withdraw", post(casts::withdraw_handler))
        // Manager-only
        .route("/casts/:slug/admin/edit", post(cast_admin::edit_cast_handler))
        .route("/casts/:slug/admin/delete", post(cast_admin::delete_cast_handler))
        .route("/casts/:slug/admin/sections", post(cast_admin::new_section_handler))
        .route(
            "/casts/:slug/admin/sections/:section_id/edit",
            post(cast_admin::edit_section_handler),
        )
        .route(
            "/casts/:slug/admin/sections/:section_id/delete",
            post(cast_admin::delete_section_handler),
        )
        .route(
            "/casts/:slug/admin/managers",
            get(cast_admin::managers_handler).post(cast_admin::add_manager_handler),
        )
        .route(
            "/casts/:slug/admin/managers/:profile_id/delete",
            post(cast_admin::remove_manager_handler),
        )
        .route("/casts/:slug/admin/requests", get(cast_admin::requests_handler))
        .route(
            "/casts/:slug/admin/requests/:profile_id/approve",
            post(cast_admin::approve_request_handler),
        )
        .route(
            "/casts/:slug/admin/requests/:profile_id/deny",
            post(cast_admin::deny_request_handler),
        )
        .route("/casts/:slug/admin/members", post(cast_admin::add_member_handler))
        .route(
            "/casts/:slug/admin/members/:profile_id/delete",
            post(cast_admin::remove_member_handler),
        )
        .route("/casts/:slug/admin/blocked", get(cast_admin::blocked_handler))
        .route(
            "/casts/:slug/admin/blocked/:profile_id",
            post(cast_admin::block_handler),
        )
        .route(
            "/casts/:slug/admin/blocked/:profile_id/unblock",
            post(cast_admin::unblock_handler),
        )
}

fn event_routes() -> Router {
    Router::new()
        .route("/events", get(events::events_handler))
        .route("/events/upcoming", get(events::upcoming_handler))
        .route("/events/new/:slug", post(events::new_event_handler))
        .route("/events/:id", get(events::event_handler))
        .route("/events/:id/edit", post(events::edit_event_handler))
        .route("/events/:id/delete", post(events::delete_event_handler))
}

fn user_routes() -> Router {
    Router::new()
        .route("/users/signup", post(users::signup_handler))
        .route("/users/settings", get(users::settings_handler))
        .route("/users/edit", post(users::edit_user_handler))
        .route("/users/edit/profile", post(users::edit_profile_handler))
        .route("/users/delete", post(users::delete_account_handler))
        .route("/users/notifications", get(users::notifications_handler))
        .route(
            "/users/notifications/read",
            post(users::read_notifications_handler),
        )
        .route(
            "/users/notifications/:id/delete",
            post(users::dismiss_notification_handler),
        )
        .route("/profiles/:username", get(public::profile_handler))
}

/// Build the Axum application router
pub fn build_app(
    pool: PgPool,
    jwt_service: Arc<JwtService>,
    allowed_origins: &[String],
    signup_enabled: bool,
) -> Router {
    let app_state = AppState {
        db_pool: pool,
        jwt_service: jwt_service.clone(),
        signup_enabled,
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(public::landing_handler))
        .route("/search/casts", get(public::search_casts_handler))
        .route("/search/profiles", get(public::search_profiles_handler))
        .merge(cast_routes())
        .merge(event_routes())
        .merge(user_routes())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

