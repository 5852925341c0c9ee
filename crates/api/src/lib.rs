//! # MachinaTrack API
//!
//! 资产追踪服务的 REST 接口，基于 Axum 构建。
//!
//! ## API 端点
//!
//! ### 设备
//! - `GET|POST /api/equipment`
//! - `GET|PUT|DELETE /api/equipment/{id}`
//! - `GET /api/equipment/{id}/maintenance` - 设备的保养记录
//!
//! ### 耗材
//! - `GET|POST /api/consumables` (`?low_stock=true&category=`)
//! - `GET|PUT|DELETE /api/consumables/{id}`
//! - `POST /api/consumables/{id}/adjust` - 领用 / 入库
//!
//! ### 保养任务
//! - `GET|POST /api/maintenance/tasks` (`?status=&equipment_id=&due_before=`)
//! - `GET|PUT|DELETE /api/maintenance/tasks/{id}`
//! - `GET /api/maintenance/due` - 到期概览
//!
//! ### 量具与校准
//! - `GET|POST /api/metrology/tools`
//! - `GET|PUT|DELETE /api/metrology/tools/{id}`
//! - `GET|POST /api/metrology/tools/{id}/calibrations`
//! - `GET /api/metrology/due`
//!
//! ### 其他
//! - `GET /health`
//! - `GET /api/dashboard`
//! - `POST /api/status/refresh`
//! - `GET /metrics` - Prometheus 指标（启用时）
//!
//! ## 鉴权
//!
//! 每个 `/api` 请求都必须携带角色请求头（默认 `x-machinatrack-role`），
//! 缺失或无法识别时返回 401，角色缺少所需权限时返回 403。
//!
//! ## 响应格式
//!
//! ```json
//! { "success": true, "data": { ... }, "message": null, "timestamp": "2024-01-01T00:00:00Z" }
//! ```
//!
//! ```json
//! { "error": { "message": "...", "type": "NOT_FOUND", "code": 404, "suggestions": [], "timestamp": "..." } }
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use middleware::{cors_layer, request_logging, trace_layer};
use routes::create_routes;

pub use routes::AppState;

/// 创建完整的API应用
pub fn create_app(state: AppState) -> Router {
    let api_config = state.config.api.clone();
    let cors = api_config.cors_enabled.then(|| cors_layer(&state));
    let router = create_routes(state.clone());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(TimeoutLayer::new(Duration::from_secs(
                api_config.request_timeout_seconds,
            )))
            .layer(axum::middleware::from_fn_with_state(
                state,
                request_logging,
            )),
    )
}
