use axum::{extract::State, response::IntoResponse};
use machinatrack_domain::Permission;

use crate::{auth::Actor, error::ApiResult, response::success, routes::AppState};

/// 车间概览：设备状态、保养与校准到期情况、低库存耗材数量
pub async fn get_dashboard(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    actor.require_all(&[
        Permission::EquipmentRead,
        Permission::InventoryRead,
        Permission::MaintenanceRead,
        Permission::MetrologyRead,
    ])?;
    let summary = state.dashboard_service.summary().await?;
    Ok(success(summary))
}
