use axum::{extract::State, response::IntoResponse};
use machinatrack_domain::Permission;
use tracing::info;

use crate::{auth::Actor, error::ApiResult, response::ApiResponse, routes::AppState};

/// 按到期日期批量修正保养任务与量具状态
pub async fn refresh_status(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    actor.require_all(&[Permission::MaintenanceWrite, Permission::MetrologyWrite])?;
    let report = state.status_service.apply_recommendations().await?;

    let applied = report.applied();
    state.metrics.record_status_recommendations(applied);
    info!(
        user = actor.name(),
        applied,
        skipped = report.skipped.len(),
        "状态刷新请求已处理"
    );

    let message = format!("已更新 {applied} 条状态");
    Ok(ApiResponse::success_with_message(report, message))
}
