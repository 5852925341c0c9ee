use std::sync::Arc;

use machinatrack_domain::services::MaintenanceService;
use machinatrack_domain::{
    DueState, EquipmentRepository, MaintenanceStatus, MaintenanceTaskFilter, MaintenanceTaskRepository,
    MaintenanceTaskUpdate, NewMaintenanceTask, TrackError,
};
use machinatrack_testing_utils::{
    clock_on, date, EquipmentBuilder, MaintenanceTaskBuilder, MockRepositories,
};

struct Fixture {
    repos: MockRepositories,
    service: MaintenanceService,
}

async fn fixture() -> Fixture {
    let repos = MockRepositories::new();
    repos
        .equipment
        .create(&EquipmentBuilder::new().with_id("mill-1").build())
        .await
        .unwrap();
    let service = MaintenanceService::new(
        repos.tasks.clone(),
        repos.equipment.clone(),
        clock_on(2024, 1, 2),
        7,
    );
    Fixture { repos, service }
}

async fn seed(fx: &Fixture, builder: MaintenanceTaskBuilder) -> String {
    let task = builder.for_equipment("mill-1").build();
    fx.repos.tasks.create(&task).await.unwrap();
    task.id
}

fn complete_on(day: Option<chrono::NaiveDate>) -> MaintenanceTaskUpdate {
    MaintenanceTaskUpdate {
        status: Some(MaintenanceStatus::Completed),
        last_performed_date: day,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_completion_spawns_next_task() {
    let fx = fixture().await;
    let id = seed(
        &fx,
        MaintenanceTaskBuilder::new()
            .with_frequency_days(30)
            .with_status(MaintenanceStatus::InProgress)
            .with_part("Spindle grease", 2),
    )
    .await;

    let outcome = fx.service.update(&id, complete_on(Some(date(2024, 1, 1)))).await.unwrap();

    assert_eq!(outcome.task.status, MaintenanceStatus::Completed);
    let next = outcome.next_task.expect("next task spawned");
    assert_eq!(next.status, MaintenanceStatus::Pending);
    assert_eq!(next.next_due_date, Some(date(2024, 1, 31)));
    assert_eq!(next.equipment_id, "mill-1");
    assert!(next.parts_used.is_empty());
    assert_ne!(next.id, id);
    assert_eq!(fx.repos.tasks.count(), 2);
}

#[tokio::test]
async fn test_ninety_day_scenario_persists_both_tasks() {
    let fx = fixture().await;
    let id = seed(
        &fx,
        MaintenanceTaskBuilder::new()
            .with_frequency_days(90)
            .with_status(MaintenanceStatus::InProgress),
    )
    .await;

    let outcome = fx.service.update(&id, complete_on(Some(date(2024, 1, 1)))).await.unwrap();
    let next = outcome.next_task.unwrap();

    let stored_original = fx.repos.tasks.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored_original.status, MaintenanceStatus::Completed);
    assert_eq!(stored_original.last_performed_date, Some(date(2024, 1, 1)));

    let stored_next = fx.repos.tasks.find_by_id(&next.id).await.unwrap().unwrap();
    assert_eq!(stored_next.next_due_date, Some(date(2024, 3, 31)));
    assert_eq!(stored_next.status, MaintenanceStatus::Pending);
    assert!(stored_next.parts_used.is_empty());
}

#[tokio::test]
async fn test_one_shot_task_does_not_recur() {
    let fx = fixture().await;
    let id = seed(&fx, MaintenanceTaskBuilder::new()).await;

    let outcome = fx.service.update(&id, complete_on(None)).await.unwrap();

    assert!(outcome.next_task.is_none());
    assert_eq!(outcome.task.last_performed_date, Some(date(2024, 1, 2)));
    assert_eq!(fx.repos.tasks.count(), 1);
}

#[tokio::test]
async fn test_resubmitting_completion_spawns_once() {
    let fx = fixture().await;
    let id = seed(&fx, MaintenanceTaskBuilder::new().with_frequency_days(14)).await;

    let first = fx.service.update(&id, complete_on(None)).await.unwrap();
    let second = fx.service.update(&id, complete_on(None)).await.unwrap();

    assert!(first.next_task.is_some());
    assert!(first.completed_now());
    assert!(second.next_task.is_none());
    assert!(!second.completed_now());
    assert_eq!(fx.repos.tasks.count(), 2);
}

#[tokio::test]
async fn test_leaving_terminal_state_is_rejected() {
    let fx = fixture().await;
    let id = seed(
        &fx,
        MaintenanceTaskBuilder::new().with_status(MaintenanceStatus::Skipped),
    )
    .await;

    let err = fx
        .service
        .update(
            &id,
            MaintenanceTaskUpdate {
                status: Some(MaintenanceStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TrackError::InvalidTransition { .. }));
    let stored = fx.repos.tasks.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, MaintenanceStatus::Skipped);
}

#[tokio::test]
async fn test_spawn_failure_rolls_back_status() {
    let fx = fixture().await;
    let id = seed(
        &fx,
        MaintenanceTaskBuilder::new()
            .with_frequency_days(30)
            .with_status(MaintenanceStatus::InProgress),
    )
    .await;
    fx.repos.tasks.fail_next_spawn();

    let err = fx.service.update(&id, complete_on(None)).await.unwrap_err();

    assert!(matches!(err, TrackError::RecurrenceScheduling(_)));
    let stored = fx.repos.tasks.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, MaintenanceStatus::InProgress);
    assert_eq!(fx.repos.tasks.count(), 1);
}

#[tokio::test]
async fn test_create_requires_existing_equipment() {
    let fx = fixture().await;
    let err = fx
        .service
        .create(NewMaintenanceTask {
            equipment_id: "missing".to_string(),
            description: "Replace way wipers".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_rejects_negative_frequency() {
    let fx = fixture().await;
    let err = fx
        .service
        .create(NewMaintenanceTask {
            equipment_id: "mill-1".to_string(),
            description: "Replace way wipers".to_string(),
            frequency_days: Some(-1),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrackError::ValidationError(_)));
}

#[tokio::test]
async fn test_create_derives_due_date() {
    let fx = fixture().await;
    let task = fx
        .service
        .create(NewMaintenanceTask {
            equipment_id: "mill-1".to_string(),
            description: "Clean chip conveyor".to_string(),
            frequency_days: Some(7),
            last_performed_date: Some(date(2024, 1, 1)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(task.next_due_date, Some(date(2024, 1, 8)));
    assert_eq!(task.status, MaintenanceStatus::Pending);
}

#[tokio::test]
async fn test_due_overview_skips_closed_tasks_and_sorts() {
    let fx = fixture().await;
    seed(&fx, MaintenanceTaskBuilder::new().with_next_due_date(date(2024, 2, 15))).await;
    seed(&fx, MaintenanceTaskBuilder::new().with_next_due_date(date(2024, 1, 1))).await;
    seed(&fx, MaintenanceTaskBuilder::new()).await;
    seed(
        &fx,
        MaintenanceTaskBuilder::new()
            .with_status(MaintenanceStatus::Completed)
            .with_next_due_date(date(2023, 6, 1)),
    )
    .await;

    let overview = fx.service.due_overview().await.unwrap();
    let states: Vec<DueState> = overview.iter().map(|e| e.due_state).collect();
    assert_eq!(
        states,
        vec![DueState::Overdue, DueState::OnTrack, DueState::Unscheduled]
    );
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let fx = fixture().await;
    seed(&fx, MaintenanceTaskBuilder::new()).await;
    seed(
        &fx,
        MaintenanceTaskBuilder::new().with_status(MaintenanceStatus::Overdue),
    )
    .await;

    let overdue = fx
        .service
        .list(&MaintenanceTaskFilter {
            status: Some(MaintenanceStatus::Overdue),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
}

#[tokio::test]
async fn test_concurrent_status_change_is_conflict() {
    let fx = fixture().await;
    let id = seed(&fx, MaintenanceTaskBuilder::new().with_frequency_days(30)).await;
    let repo: Arc<dyn MaintenanceTaskRepository> = fx.repos.tasks.clone();

    let snapshot = repo.find_by_id(&id).await.unwrap().unwrap();
    fx.repos.tasks.force_status(&id, MaintenanceStatus::Completed);
    let mut stale = snapshot.clone();
    stale.status = MaintenanceStatus::InProgress;

    let err = repo.apply_update(&snapshot, &stale, None).await.unwrap_err();
    assert!(matches!(err, TrackError::Conflict(_)));
}

#[tokio::test]
async fn test_concurrent_field_edit_is_conflict() {
    let fx = fixture().await;
    let id = seed(&fx, MaintenanceTaskBuilder::new().with_description("更换主轴润滑油")).await;
    let repo: Arc<dyn MaintenanceTaskRepository> = fx.repos.tasks.clone();
    let snapshot = repo.find_by_id(&id).await.unwrap().unwrap();

    // 另一请求只改了负责人，状态未变
    let mut edited = snapshot.clone();
    edited.assigned_to = Some("王师傅".to_string());
    edited.updated_at = snapshot.updated_at + chrono::Duration::minutes(5);
    repo.update(&edited).await.unwrap();

    let mut mine = snapshot.clone();
    mine.description = "更换主轴润滑油并清洗滤网".to_string();
    let err = repo.apply_update(&snapshot, &mine, None).await.unwrap_err();
    assert!(matches!(err, TrackError::Conflict(_)));

    let stored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.assigned_to.as_deref(), Some("王师傅"));
    assert_eq!(stored.description, "更换主轴润滑油");

    // 基于最新快照重试即可写入
    let mut retried = stored.clone();
    retried.description = mine.description.clone();
    let outcome = repo.apply_update(&stored, &retried, None).await.unwrap();
    assert_eq!(outcome.task.assigned_to.as_deref(), Some("王师傅"));
}
