use axum::{
    routing::{get, post},
    Router,
};
use machinatrack_config::AppConfig;
use machinatrack_domain::services::{
    DashboardService, EquipmentService, InventoryService, MaintenanceService, MetrologyService,
    StatusService,
};
use machinatrack_domain::Clock;
use machinatrack_infrastructure::{DatabaseManager, MetricsCollector};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::handlers::{
    consumables::{
        adjust_consumable, create_consumable, delete_consumable, get_consumable, list_consumables,
        update_consumable,
    },
    dashboard::get_dashboard,
    equipment::{
        create_equipment, delete_equipment, get_equipment, get_equipment_maintenance,
        list_equipment, update_equipment,
    },
    health::health_check,
    maintenance::{
        create_task, delete_task, get_task, list_due_tasks, list_tasks, update_task,
    },
    metrics::render_metrics,
    metrology::{
        create_tool, delete_tool, get_tool, list_calibrations, list_due_tools, list_tools,
        record_calibration, update_tool,
    },
    status::refresh_status,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub equipment_service: Arc<EquipmentService>,
    pub inventory_service: Arc<InventoryService>,
    pub maintenance_service: Arc<MaintenanceService>,
    pub metrology_service: Arc<MetrologyService>,
    pub dashboard_service: Arc<DashboardService>,
    pub status_service: Arc<StatusService>,
    pub database: DatabaseManager,
    pub metrics: MetricsCollector,
    pub prometheus: Option<PrometheusHandle>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 用同一个连接池上的仓储装配全部服务
    pub fn new(
        database: DatabaseManager,
        config: AppConfig,
        clock: Arc<dyn Clock>,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        let equipment = database.equipment_repository();
        let consumables = database.consumable_repository();
        let tasks = database.maintenance_task_repository();
        let tools = database.metrology_tool_repository();
        let calibration_logs = database.calibration_log_repository();

        let maintenance_lead_days = config.scheduling.maintenance_lead_days;
        let calibration_lead_days = config.scheduling.calibration_lead_days;

        Self {
            equipment_service: Arc::new(EquipmentService::new(
                equipment.clone(),
                tasks.clone(),
                clock.clone(),
            )),
            inventory_service: Arc::new(InventoryService::new(consumables.clone(), clock.clone())),
            maintenance_service: Arc::new(MaintenanceService::new(
                tasks.clone(),
                equipment.clone(),
                clock.clone(),
                maintenance_lead_days,
            )),
            metrology_service: Arc::new(MetrologyService::new(
                tools.clone(),
                calibration_logs,
                clock.clone(),
                calibration_lead_days,
            )),
            dashboard_service: Arc::new(DashboardService::new(
                equipment,
                consumables,
                tasks.clone(),
                tools.clone(),
                clock.clone(),
                maintenance_lead_days,
                calibration_lead_days,
            )),
            status_service: Arc::new(StatusService::new(
                tasks,
                tools,
                clock,
                maintenance_lead_days,
                calibration_lead_days,
            )),
            database,
            metrics: MetricsCollector::new(),
            prometheus,
            config: Arc::new(config),
        }
    }
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    let mut router = Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 设备
        .route("/api/equipment", get(list_equipment).post(create_equipment))
        .route(
            "/api/equipment/{id}",
            get(get_equipment).put(update_equipment).delete(delete_equipment),
        )
        .route("/api/equipment/{id}/maintenance", get(get_equipment_maintenance))
        // 耗材库存
        .route("/api/consumables", get(list_consumables).post(create_consumable))
        .route(
            "/api/consumables/{id}",
            get(get_consumable).put(update_consumable).delete(delete_consumable),
        )
        .route("/api/consumables/{id}/adjust", post(adjust_consumable))
        // 保养任务
        .route("/api/maintenance/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/maintenance/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/maintenance/due", get(list_due_tasks))
        // 量具与校准
        .route("/api/metrology/tools", get(list_tools).post(create_tool))
        .route(
            "/api/metrology/tools/{id}",
            get(get_tool).put(update_tool).delete(delete_tool),
        )
        .route(
            "/api/metrology/tools/{id}/calibrations",
            get(list_calibrations).post(record_calibration),
        )
        .route("/api/metrology/due", get(list_due_tools))
        // 汇总与状态刷新
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/status/refresh", post(refresh_status));

    if state.prometheus.is_some() && state.config.observability.metrics_enabled {
        router = router.route(
            state.config.observability.metrics_endpoint.as_str(),
            get(render_metrics),
        );
    }

    router.with_state(state)
}
