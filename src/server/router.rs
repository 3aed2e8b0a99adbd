//! Shared routes and middleware wrapped around the entity routes

use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::core::error::{ConfigError, ErrorResponse};

const SERVICE_NAME: &str = "pagemeta";

/// `GET /health` and `GET /healthz`
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
    }))
}

/// Error envelope for paths no route matches
pub async fn route_not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            code: "ROUTE_NOT_FOUND".to_string(),
            message: format!("No route for {}", uri.path()),
            details: None,
        }),
    )
}

/// Build the CORS layer for browser clients
///
/// An empty origin list mirrors the caller's origin, which keeps
/// credentialed requests working from any front end host.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let wildcard = config.allowed_origins.iter().any(|o| o.trim() == "*");
    if wildcard && config.allow_credentials {
        return Err(ConfigError::InvalidValue {
            field: "cors.allowed_origins".into(),
            value: "*".into(),
            message: "a wildcard origin cannot be combined with credentials".into(),
        });
    }
    let origin = if wildcard {
        AllowOrigin::any()
    } else if config.allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim()).map_err(|e| ConfigError::InvalidValue {
                    field: "cors.allowed_origins".into(),
                    value: origin.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    let headers = if config.allow_credentials {
        AllowHeaders::mirror_request()
    } else {
        AllowHeaders::any()
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials))
}

/// Attach the fallback, request tracing and CORS to a finished router
pub fn apply_layers(router: Router, cors: &CorsConfig) -> Result<Router, ConfigError> {
    Ok(router
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors)?))
}
