#[cfg(test)]
mod tests {
    use crate::commands::environment::validate_environment_log;
    use crate::commands::garden::GardenUpdate;
    use crate::commands::growth_log::validate_growth_log;
    use crate::commands::pod::validate_pod;
    use crate::commands::reminder::validate_reminder;
    use crate::commands::seed::validate_seed;
    use crate::commands::seed_batch::predicted_harvest;
    use crate::commands::task::validate_task;
    use crate::db::{
        Garden, GardenEnvironmentLog, GardenPod, GrowthLogEntry, PodStatus, Reminder, Seed,
        SeedType, Task, TaskPriority, TaskScope, TaskStatus, TaskType,
    };
    use crate::error::ApiError;
    use chrono::{Duration, NaiveDate, Utc};
    use sqlx::types::Json;

    fn sample_seed() -> Seed {
        let now = Utc::now();
        Seed {
            id: "seed_test".to_string(),
            name: "Cherry Tomato".to_string(),
            seed_type: SeedType::Vegetable,
            variety: Some("Sweet 100".to_string()),
            supplier: None,
            germination_days: 7,
            days_to_harvest: 65,
            optimal_ph_min: Some(5.5),
            optimal_ph_max: Some(6.5),
            optimal_ec_min: None,
            optimal_ec_max: None,
            optimal_temp_c_min: None,
            optimal_temp_c_max: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: "task_test".to_string(),
            task_type: TaskType::NutrientRefill,
            scope: TaskScope::Garden,
            title: "Refill nutrient solution".to_string(),
            description: None,
            seed_batch_id: None,
            garden_id: Some("garden_001".to_string()),
            pod_id: None,
            scheduled_date: now,
            due_date: None,
            completed_date: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            reminder_sent: false,
            reminder_minutes_before: 60,
            is_recurring: false,
            recurrence_pattern: None,
            recurrence_interval: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn violated_fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_seed_validation_reports_every_violation() {
        let mut seed = sample_seed();
        seed.germination_days = -1;
        seed.optimal_ph_min = Some(7.0);
        seed.optimal_ph_max = Some(6.0);

        let fields = violated_fields(validate_seed(&seed).unwrap_err());
        assert!(fields.contains(&"germination_days".to_string()));
        assert!(fields.contains(&"optimal_ph_min".to_string()));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_seed_validation_accepts_single_bound() {
        let mut seed = sample_seed();
        seed.optimal_ph_max = None;
        assert!(validate_seed(&seed).is_ok());
    }

    #[test]
    fn test_predicted_harvest_date_math() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert_eq!(
            predicted_harvest(start, 65),
            NaiveDate::from_ymd_opt(2025, 12, 5).unwrap()
        );
    }

    #[test]
    fn test_task_requires_exactly_one_reference() {
        let mut task = sample_task();
        task.seed_batch_id = Some("batch_001".to_string());
        let fields = violated_fields(validate_task(&task).unwrap_err());
        assert_eq!(fields, vec!["scope".to_string()]);

        let mut task = sample_task();
        task.garden_id = None;
        let fields = violated_fields(validate_task(&task).unwrap_err());
        assert_eq!(fields, vec!["scope".to_string()]);
    }

    #[test]
    fn test_task_reference_must_match_scope() {
        let mut task = sample_task();
        task.scope = TaskScope::Pod;
        let fields = violated_fields(validate_task(&task).unwrap_err());
        assert_eq!(fields, vec!["scope".to_string()]);
    }

    #[test]
    fn test_task_completed_date_requires_completed_status() {
        let mut task = sample_task();
        task.completed_date = Some(Utc::now());
        let fields = violated_fields(validate_task(&task).unwrap_err());
        assert_eq!(fields, vec!["completed_date".to_string()]);

        task.status = TaskStatus::Completed;
        assert!(validate_task(&task).is_ok());
    }

    #[test]
    fn test_recurring_task_requires_pattern_and_interval() {
        let mut task = sample_task();
        task.is_recurring = true;
        let fields = violated_fields(validate_task(&task).unwrap_err());
        assert!(fields.contains(&"recurrence_pattern".to_string()));
        assert!(fields.contains(&"recurrence_interval".to_string()));

        task.recurrence_pattern = Some("weekly".to_string());
        task.recurrence_interval = Some(7);
        assert!(validate_task(&task).is_ok());
    }

    #[test]
    fn test_task_due_date_must_not_precede_scheduled_date() {
        let mut task = sample_task();
        task.due_date = Some(task.scheduled_date - Duration::hours(1));
        let fields = violated_fields(validate_task(&task).unwrap_err());
        assert_eq!(fields, vec!["due_date".to_string()]);

        // Same instant is allowed.
        task.due_date = Some(task.scheduled_date);
        assert!(validate_task(&task).is_ok());
    }

    #[test]
    fn test_growth_log_measurements_must_be_non_negative() {
        let now = Utc::now();
        let mut entry = GrowthLogEntry {
            id: "log_test".to_string(),
            seed_batch_id: "batch_001".to_string(),
            timestamp: now,
            observation: None,
            height_cm: Some(5.2),
            leaf_count: Some(4),
            photo_urls: Json(vec![]),
            notes: None,
            created_at: now,
        };
        assert!(validate_growth_log(&entry).is_ok());

        entry.height_cm = Some(-0.5);
        entry.leaf_count = Some(-1);
        let fields = violated_fields(validate_growth_log(&entry).unwrap_err());
        assert!(fields.contains(&"height_cm".to_string()));
        assert!(fields.contains(&"leaf_count".to_string()));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_environment_log_reading_bounds() {
        let now = Utc::now();
        let mut log = GardenEnvironmentLog {
            id: "envlog_test".to_string(),
            garden_id: "garden_001".to_string(),
            timestamp: now,
            ph_level: Some(6.1),
            ec_level: None,
            water_temp_c: None,
            dissolved_oxygen: None,
            air_temp_c: None,
            humidity_percent: Some(55.0),
            light_intensity_lux: Some(12000),
            notes: None,
            created_at: now,
        };
        assert!(validate_environment_log(&log).is_ok());

        // Bounds are inclusive.
        log.humidity_percent = Some(0.0);
        assert!(validate_environment_log(&log).is_ok());
        log.humidity_percent = Some(100.0);
        assert!(validate_environment_log(&log).is_ok());

        log.humidity_percent = Some(101.0);
        log.light_intensity_lux = Some(-1);
        let fields = violated_fields(validate_environment_log(&log).unwrap_err());
        assert!(fields.contains(&"humidity_percent".to_string()));
        assert!(fields.contains(&"light_intensity_lux".to_string()));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_pod_occupancy_rules() {
        let now = Utc::now();
        let mut pod = GardenPod {
            id: "pod_test".to_string(),
            garden_id: "garden_001".to_string(),
            pod_number: 1,
            name: None,
            status: PodStatus::Empty,
            seed_batch_id: None,
            planted_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_pod(&pod).is_ok());

        // A batch in an "empty" pod is contradictory.
        pod.seed_batch_id = Some("batch_001".to_string());
        let fields = violated_fields(validate_pod(&pod).unwrap_err());
        assert_eq!(fields, vec!["status".to_string()]);

        pod.status = PodStatus::Planted;
        pod.planted_date = NaiveDate::from_ymd_opt(2025, 10, 1);
        assert!(validate_pod(&pod).is_ok());

        // Planted date without an occupying batch.
        pod.seed_batch_id = None;
        pod.status = PodStatus::Empty;
        let fields = violated_fields(validate_pod(&pod).unwrap_err());
        assert_eq!(fields, vec!["planted_date".to_string()]);
    }

    #[test]
    fn test_reminder_reference_is_exclusive() {
        let mut reminder = Reminder {
            id: "reminder_test".to_string(),
            task_id: Some("task_001".to_string()),
            seed_batch_id: None,
            reminder_type: "task".to_string(),
            message: "Harvest in 1 hour".to_string(),
            scheduled_time: Utc::now(),
            sent: false,
            sent_at: None,
            created_at: Utc::now(),
        };
        assert!(validate_reminder(&reminder).is_ok());

        reminder.seed_batch_id = Some("batch_001".to_string());
        let fields = violated_fields(validate_reminder(&reminder).unwrap_err());
        assert_eq!(fields, vec!["task_id".to_string()]);

        reminder.task_id = None;
        reminder.seed_batch_id = None;
        let fields = violated_fields(validate_reminder(&reminder).unwrap_err());
        assert_eq!(fields, vec!["task_id".to_string()]);
    }

    #[test]
    fn test_garden_patch_null_clears_absent_keeps() {
        let now = Utc::now();
        let mut garden = Garden {
            id: "garden_test".to_string(),
            name: "Indoor Hydro".to_string(),
            description: Some("kitchen unit".to_string()),
            total_pods: 12,
            system_type: Some("nft".to_string()),
            location: Some("kitchen".to_string()),
            is_active: true,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let patch: GardenUpdate =
            serde_json::from_str(r#"{"description": null, "location": "basement"}"#).unwrap();
        patch.apply(&mut garden);

        assert_eq!(garden.description, None);
        assert_eq!(garden.location.as_deref(), Some("basement"));
        // system_type was absent from the payload and must survive.
        assert_eq!(garden.system_type.as_deref(), Some("nft"));
    }

    #[test]
    fn test_garden_patch_apply_is_idempotent() {
        let now = Utc::now();
        let mut garden = Garden {
            id: "garden_test".to_string(),
            name: "Indoor Hydro".to_string(),
            description: Some("kitchen unit".to_string()),
            total_pods: 12,
            system_type: None,
            location: None,
            is_active: true,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let patch: GardenUpdate =
            serde_json::from_str(r#"{"name": "Basement Hydro", "description": null}"#).unwrap();
        patch.clone().apply(&mut garden);
        let once = serde_json::to_value(&garden).unwrap();
        patch.apply(&mut garden);
        let twice = serde_json::to_value(&garden).unwrap();

        assert_eq!(once, twice);
    }
}
