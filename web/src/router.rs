use crate::{
    controller::{
        auth_controller, config_controller, fallback_controller, health_check_controller,
        platform_user_controller, tiktok_controller,
    },
    middleware::auth::require_login,
    response::{config_summary, health, token_info},
    AppState,
};
use axum::{
    handler::HandlerWithoutStateExt,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use tower_http::services::ServeDir;

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "TikTok Connect API"
        ),
        paths(
            auth_controller::login,
            auth_controller::callback,
            auth_controller::logout,
            auth_controller::token_info,
            tiktok_controller::user_info,
            tiktok_controller::videos,
            platform_user_controller::index,
            health_check_controller::health_check,
            config_controller::test_config,
        ),
        components(
            schemas(
                domain::platform_users::Model,
                token_info::TokenInfo,
                health::HealthStatus,
                config_summary::ConfigReport,
                config_summary::ConfigSummary,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "tiktok_connect", description = "TikTok login and API pass-through")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value set by /auth/login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let static_dir = app_state.config().static_dir().to_string();

    Router::new()
        .merge(auth_routes(app_state.clone()))
        .merge(protected_routes(app_state.clone()))
        .merge(platform_user_routes(app_state.clone()))
        .merge(health_routes(app_state))
        .merge(api_doc_routes())
        // Static files are tried before the JSON 404 for anything no route matched.
        .fallback_service(
            ServeDir::new(static_dir)
                .call_fallback_on_method_not_allowed(true)
                .fallback(fallback_controller::not_found.into_service()),
        )
}

/// Login flow endpoints. These create the login session when the browser has none.
fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", get(auth_controller::login))
        .route("/auth/callback", get(auth_controller::callback))
        .route("/auth/logout", get(auth_controller::logout))
        .with_state(app_state)
}

/// Endpoints that need tokens in the caller's session
fn protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/token-info", get(auth_controller::token_info))
        .route("/user/info", get(tiktok_controller::user_info))
        .route("/user/videos", get(tiktok_controller::videos))
        .route_layer(from_fn_with_state(app_state.clone(), require_login))
        .with_state(app_state)
}

fn platform_user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", get(platform_user_controller::index))
        .with_state(app_state)
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .route("/test/config", get(config_controller::test_config))
        .with_state(app_state)
}

fn api_doc_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
