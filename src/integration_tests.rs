#[cfg(test)]
mod tests {
    use crate::commands::environment::create_environment_log_internal;
    use crate::commands::garden::{
        create_garden_internal, delete_garden_internal, get_garden_internal,
        update_garden_internal, GardenCreate, GardenUpdate,
    };
    use crate::commands::growth_log::{create_growth_log_internal, list_growth_logs_internal};
    use crate::commands::pod::{create_pod_internal, PodCreate};
    use crate::commands::reminder::{create_reminder_internal, mark_sent_internal};
    use crate::commands::seed::{
        create_seed_internal, delete_seed_internal, get_seed_internal, update_seed_internal,
        SeedCreate, SeedUpdate,
    };
    use crate::commands::seed_batch::{
        create_batch_internal, update_batch_internal, SeedBatchCreate,
    };
    use crate::commands::task::{
        create_task_internal, get_task_internal, list_tasks_internal, update_task_internal,
        TaskFilter,
    };
    use crate::db::{self, DbPool, GrowthStage, TaskStatus};
    use crate::error::ApiError;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::str::FromStr;

    async fn setup_test_db() -> DbPool {
        let opts = sqlx::sqlite::SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Invalid sqlite options")
            .foreign_keys(true);
        // One connection keeps every query on the same in-memory database.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .expect("Failed to create pool");
        db::init_database(&pool).await.expect("Failed to migrate");
        pool
    }

    fn seed_payload(name: &str, days_to_harvest: i64) -> SeedCreate {
        serde_json::from_value(json!({
            "name": name,
            "seed_type": "vegetable",
            "days_to_harvest": days_to_harvest,
        }))
        .unwrap()
    }

    fn garden_payload(name: &str, total_pods: i64) -> GardenCreate {
        serde_json::from_value(json!({ "name": name, "total_pods": total_pods })).unwrap()
    }

    #[tokio::test]
    async fn test_seed_create_get_round_trip() {
        let pool = setup_test_db().await;

        let created = create_seed_internal(&pool, seed_payload("Cherry Tomato", 65))
            .await
            .expect("create failed");
        assert!(created.id.starts_with("seed_"));
        assert_eq!(created.germination_days, 7); // payload default

        let fetched = get_seed_internal(&pool, &created.id).await.expect("get failed");
        assert_eq!(
            serde_json::to_value(&fetched).unwrap(),
            serde_json::to_value(&created).unwrap()
        );
    }

    #[tokio::test]
    async fn test_seed_update_is_idempotent() {
        let pool = setup_test_db().await;
        let seed = create_seed_internal(&pool, seed_payload("Basil", 30))
            .await
            .unwrap();

        let patch: SeedUpdate = serde_json::from_value(json!({
            "name": "Genovese Basil",
            "supplier": "Burpee Seeds",
            "optimal_ph_min": 5.5,
        }))
        .unwrap();

        let once = update_seed_internal(&pool, &seed.id, patch.clone())
            .await
            .unwrap();
        let twice = update_seed_internal(&pool, &seed.id, patch).await.unwrap();

        let mut a = serde_json::to_value(&once).unwrap();
        let mut b = serde_json::to_value(&twice).unwrap();
        a.as_object_mut().unwrap().remove("updated_at");
        b.as_object_mut().unwrap().remove("updated_at");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_seed_delete_then_delete_again_not_found() {
        let pool = setup_test_db().await;
        let seed = create_seed_internal(&pool, seed_payload("Mint", 40))
            .await
            .unwrap();

        delete_seed_internal(&pool, &seed.id).await.unwrap();
        let err = delete_seed_internal(&pool, &seed.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_batch_create_computes_predicted_harvest() {
        let pool = setup_test_db().await;
        let seed = create_seed_internal(&pool, seed_payload("Cherry Tomato", 65))
            .await
            .unwrap();

        let batch = create_batch_internal(
            &pool,
            SeedBatchCreate {
                seed_id: seed.id.clone(),
                batch_number: Some("BATCH-2025-001".to_string()),
                germination_start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(batch.current_stage, GrowthStage::Germination);
        assert_eq!(
            batch.predicted_harvest_date,
            NaiveDate::from_ymd_opt(2025, 12, 5)
        );
    }

    #[tokio::test]
    async fn test_batch_create_unknown_seed_not_found() {
        let pool = setup_test_db().await;

        let err = create_batch_internal(
            &pool,
            SeedBatchCreate {
                seed_id: "seed_missing".to_string(),
                batch_number: None,
                germination_start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_batch_update_rejects_harvest_before_start() {
        let pool = setup_test_db().await;
        let seed = create_seed_internal(&pool, seed_payload("Lettuce", 45))
            .await
            .unwrap();
        let batch = create_batch_internal(
            &pool,
            SeedBatchCreate {
                seed_id: seed.id,
                batch_number: None,
                germination_start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                notes: None,
            },
        )
        .await
        .unwrap();

        let patch = serde_json::from_value(json!({ "actual_harvest_date": "2025-09-01" })).unwrap();
        let err = update_batch_internal(&pool, &batch.id, patch).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pod_capacity_conflict() {
        let pool = setup_test_db().await;
        let garden = create_garden_internal(&pool, garden_payload("Indoor Hydro", 2))
            .await
            .unwrap();

        for n in 1..=2 {
            let payload: PodCreate = serde_json::from_value(json!({ "pod_number": n })).unwrap();
            create_pod_internal(&pool, &garden.id, payload).await.unwrap();
        }

        let payload: PodCreate = serde_json::from_value(json!({ "pod_number": 3 })).unwrap();
        let err = create_pod_internal(&pool, &garden.id, payload).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_pod_number_conflict() {
        let pool = setup_test_db().await;
        let garden = create_garden_internal(&pool, garden_payload("Indoor Hydro", 12))
            .await
            .unwrap();

        let payload: PodCreate = serde_json::from_value(json!({ "pod_number": 1 })).unwrap();
        create_pod_internal(&pool, &garden.id, payload).await.unwrap();

        let payload: PodCreate = serde_json::from_value(json!({ "pod_number": 1 })).unwrap();
        let err = create_pod_internal(&pool, &garden.id, payload).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_garden_shrink_below_pod_count_conflict() {
        let pool = setup_test_db().await;
        let garden = create_garden_internal(&pool, garden_payload("Indoor Hydro", 3))
            .await
            .unwrap();
        for n in 1..=2 {
            let payload: PodCreate = serde_json::from_value(json!({ "pod_number": n })).unwrap();
            create_pod_internal(&pool, &garden.id, payload).await.unwrap();
        }

        let patch: GardenUpdate = serde_json::from_value(json!({ "total_pods": 1 })).unwrap();
        let err = update_garden_internal(&pool, &garden.id, patch).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_garden_delete_cascades_pods_and_env_logs() {
        let pool = setup_test_db().await;
        let garden = create_garden_internal(&pool, garden_payload("Indoor Hydro", 4))
            .await
            .unwrap();

        let payload: PodCreate = serde_json::from_value(json!({ "pod_number": 1 })).unwrap();
        create_pod_internal(&pool, &garden.id, payload).await.unwrap();
        let env = serde_json::from_value(json!({ "ph_level": 6.1, "humidity_percent": 55.0 })).unwrap();
        create_environment_log_internal(&pool, &garden.id, env).await.unwrap();

        delete_garden_internal(&pool, &garden.id).await.unwrap();

        let err = get_garden_internal(&pool, &garden.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let pods: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM garden_pods WHERE garden_id = ?")
            .bind(&garden.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let logs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM garden_environment_logs WHERE garden_id = ?")
                .bind(&garden.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(pods, 0);
        assert_eq!(logs, 0);
    }

    #[tokio::test]
    async fn test_growth_logs_scoped_to_batch() {
        let pool = setup_test_db().await;
        let seed = create_seed_internal(&pool, seed_payload("Cherry Tomato", 65))
            .await
            .unwrap();
        let batch = create_batch_internal(
            &pool,
            SeedBatchCreate {
                seed_id: seed.id,
                batch_number: None,
                germination_start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                notes: None,
            },
        )
        .await
        .unwrap();

        let entry = serde_json::from_value(json!({
            "observation": "First true leaves emerging",
            "height_cm": 5.2,
            "leaf_count": 4,
        }))
        .unwrap();
        create_growth_log_internal(&pool, &batch.id, entry).await.unwrap();

        let logs = list_growth_logs_internal(&pool, &batch.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].leaf_count, Some(4));

        let err = list_growth_logs_internal(&pool, "batch_missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_task_filter_and_completion() {
        let pool = setup_test_db().await;

        let garden_task = serde_json::from_value(json!({
            "task_type": "nutrient_refill",
            "scope": "garden",
            "title": "Refill nutrient solution",
            "garden_id": "garden_001",
            "scheduled_date": "2025-10-10T09:00:00Z",
        }))
        .unwrap();
        let task = create_task_internal(&pool, garden_task).await.unwrap();

        let seed_task = serde_json::from_value(json!({
            "task_type": "harvest",
            "scope": "seed",
            "title": "Harvest cherry tomatoes",
            "seed_batch_id": "batch_001",
            "scheduled_date": "2025-12-05T09:00:00Z",
        }))
        .unwrap();
        create_task_internal(&pool, seed_task).await.unwrap();

        let filtered = list_tasks_internal(
            &pool,
            TaskFilter {
                garden_id: Some("garden_001".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, task.id);

        // completed_date only together with completed status
        let bad = serde_json::from_value(json!({ "completed_date": "2025-10-10T10:00:00Z" })).unwrap();
        let err = update_task_internal(&pool, &task.id, bad).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let good = serde_json::from_value(json!({
            "status": "completed",
            "completed_date": "2025-10-10T10:00:00Z",
        }))
        .unwrap();
        let updated = update_task_internal(&pool, &task.id, good).await.unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert!(updated.completed_date.is_some());
    }

    #[tokio::test]
    async fn test_task_update_cannot_move_scheduled_past_due() {
        let pool = setup_test_db().await;

        let payload = serde_json::from_value(json!({
            "task_type": "ph_check",
            "scope": "garden",
            "title": "Check pH",
            "garden_id": "garden_001",
            "scheduled_date": "2025-10-10T09:00:00Z",
            "due_date": "2025-10-11T09:00:00Z",
        }))
        .unwrap();
        let task = create_task_internal(&pool, payload).await.unwrap();

        let patch = serde_json::from_value(json!({ "scheduled_date": "2025-10-12T09:00:00Z" }))
            .unwrap();
        let err = update_task_internal(&pool, &task.id, patch).await.unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "due_date");
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        // Rejected update must not be persisted.
        let stored = get_task_internal(&pool, &task.id).await.unwrap();
        assert_eq!(stored.scheduled_date, task.scheduled_date);
    }

    #[tokio::test]
    async fn test_reminder_mark_sent() {
        let pool = setup_test_db().await;

        let payload = serde_json::from_value(json!({
            "task_id": "task_001",
            "reminder_type": "task",
            "message": "Cherry tomatoes ready for harvest in 1 hour",
            "scheduled_time": "2025-12-05T08:00:00Z",
        }))
        .unwrap();
        let reminder = create_reminder_internal(&pool, payload).await.unwrap();
        assert!(!reminder.sent);
        assert!(reminder.sent_at.is_none());

        let sent = mark_sent_internal(&pool, &reminder.id).await.unwrap();
        assert!(sent.sent);
        let first_sent_at = sent.sent_at.expect("sent_at must be set");

        // Marking again keeps the original delivery time.
        let again = mark_sent_internal(&pool, &reminder.id).await.unwrap();
        assert_eq!(again.sent_at, Some(first_sent_at));
    }

    #[tokio::test]
    async fn test_health_reports_database_failure() {
        use crate::commands::system::health;
        use crate::config::Settings;
        use crate::state::AppState;
        use axum::extract::State;
        use std::sync::Arc;

        let pool = setup_test_db().await;
        pool.close().await;

        let state = AppState {
            pool,
            cache: None,
            settings: Arc::new(Settings::from_env()),
        };

        let err = health(State(state)).await.unwrap_err();
        match err {
            ApiError::ServiceUnavailable(msg) => assert_eq!(msg, "Database connection failed"),
            other => panic!("expected 503, got {:?}", other),
        }
    }
}
