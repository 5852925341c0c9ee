use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, Method},
    middleware::Next,
    response::Response,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::routes::AppState;

/// 记录每个请求的方法、路径、角色、状态码和耗时
pub async fn request_logging(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let role = request
        .headers()
        .get(state.config.api.role_header.as_str())
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if response.status().is_client_error() || response.status().is_server_error() {
        warn!(%method, %path, %role, status, elapsed_ms, "请求处理异常");
    } else {
        info!(%method, %path, %role, status, elapsed_ms, "完成请求处理");
    }

    response
}

/// 允许浏览器前端携带角色与用户请求头跨域访问
pub fn cors_layer(state: &AppState) -> CorsLayer {
    let api = &state.config.api;
    let mut allowed_headers = vec![header::CONTENT_TYPE];
    for name in [&api.role_header, &api.user_header] {
        if let Ok(name) = HeaderName::try_from(name.as_str()) {
            allowed_headers.push(name);
        }
    }

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(allowed_headers)
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
