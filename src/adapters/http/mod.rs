//! HTTP adapters - router assembly and status endpoints.
//!
//! [`build_router`] wires the WebSocket routes and the status routes
//! together with request tracing and CORS.

pub mod dto;
pub mod status;

use ::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::config::ServerConfig;

pub use status::status_router;

/// Builds the application router.
pub fn build_router(state: WebSocketState, server: &ServerConfig) -> Router {
    Router::new()
        .merge(websocket_router())
        .merge(status_router())
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::hub::HubManager;
    use crate::config::HubConfig;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(server: &ServerConfig) -> Router {
        let manager = Arc::new(HubManager::new(HubConfig::default()));
        build_router(WebSocketState::new(manager), server)
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let server = ServerConfig {
            cors_origins: "http://localhost:5173".to_string(),
            ..Default::default()
        };

        let response = app(&server)
            .oneshot(
                Request::builder()
                    .uri("/api/hello")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn cors_ignores_unknown_origin() {
        let response = app(&ServerConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/api/hello")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app(&ServerConfig::default())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
