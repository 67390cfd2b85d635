use axum::{
    extract::State,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use serde_json::Value;

use crate::{
    error::{AppError, Result},
    extract::Json,
    middleware::rate_limit::rate_limit_middleware,
    services::piston::{ExecutePayload, ExecuteRequest, PistonError},
    AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new().route("/runtimes", get(runtimes)).route(
        "/execute",
        // Execution is the expensive route; it gets its own admission gate,
        // keyed by user since auth has already run by this point.
        post(execute).route_layer(axum_middleware::from_fn_with_state(
            state,
            rate_limit_middleware,
        )),
    )
}

/// Relays the engine's runtime listing verbatim. Advisory data, so no retry;
/// the client just asks again.
async fn runtimes(State(state): State<AppState>) -> Result<Json<Value>> {
    let body = state.piston.runtimes().await.map_err(|err| {
        tracing::error!("failed to fetch runtimes: {err}");
        AppError::Upstream {
            message: "Failed to fetch runtimes".to_string(),
            detail: Some(err.to_string()),
        }
    })?;

    Ok(Json(body))
}

async fn execute(
    State(state): State<AppState>,
    Json(body): Json<ExecuteRequest>,
) -> Result<Json<Value>> {
    if body.language.is_empty() || body.version.is_empty() {
        return Err(AppError::Validation(
            "'language' and 'version' are required.".to_string(),
        ));
    }

    let payload = ExecutePayload::from_request(body);

    let response = state.piston.execute(&payload).await.map_err(|err| {
        tracing::error!("execution error: {err}");
        let detail = match &err {
            PistonError::Remote { detail, .. } if !detail.is_empty() => detail.clone(),
            other => other.to_string(),
        };
        AppError::Upstream {
            message: "Execution failed".to_string(),
            detail: Some(detail),
        }
    })?;

    Ok(Json(response))
}
