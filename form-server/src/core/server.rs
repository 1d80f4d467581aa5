//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::time::Duration;

use axum::extract::Request;
use axum::{Router, ServiceExt};
use http::{HeaderName, StatusCode};
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::AppError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 组装完整应用: 路由 + 中间件 + 末尾斜杠归一化
///
/// 归一化必须包在 Router 外层，路由匹配前生效。
pub fn build_app(state: ServerState) -> NormalizePath<Router> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = timeout_layer(state.config.request_timeout_ms);

    let router = api::router(state)
        .layer(CompressionLayer::new())
        .layer(timeout)
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Requests running past `ms` are answered with 408
fn timeout_layer(ms: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_millis(ms))
}

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Open the database, bind the port and serve until Ctrl-C
    pub async fn run(self) -> Result<(), AppError> {
        let state = ServerState::initialize(self.config.clone()).await?;

        let app = build_app(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("📝 Form server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt as _;

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(20));

        let response = app
            .oneshot(http::Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
