use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod lang;
pub mod middleware;
pub mod routes;
pub mod services;

/// Request bodies above this are rejected outright.
pub const BODY_LIMIT: usize = 400 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
    pub config: config::Config,
    pub limiter: middleware::rate_limit::RateLimiter,
    pub piston: services::piston::PistonClient,
}

/// Assembles the full router: rate limiting on the abuse-prone routes,
/// token auth on everything project- or execution-related.
pub fn app(state: AppState) -> Router {
    let public = routes::auth::router().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::rate_limit::rate_limit_middleware,
    ));

    let protected = Router::new()
        .merge(routes::projects::router())
        .merge(routes::execute::router(state.clone()))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let api_router = Router::new().merge(public).merge(protected);

    let mut app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/users", api_router)
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT));

    // Browser clients hit the API cross-origin during development only.
    if !state.config.production {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app
}

async fn health_check() -> &'static str {
    "OK"
}
