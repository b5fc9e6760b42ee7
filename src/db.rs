use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Sqlite};
use std::path::Path;
use uuid::Uuid;

use crate::error::ApiResult;

pub type DbPool = Pool<Sqlite>;

pub async fn init_pool(path: &Path) -> ApiResult<DbPool> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    Ok(SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect_with(opts)
        .await?)
}

pub async fn init_database(pool: &DbPool) -> ApiResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Prefixed identifier for a new record, e.g. `seed_4f9a...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SeedType {
    Vegetable,
    Fruit,
    Herb,
    Flower,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum GrowthStage {
    #[default]
    Germination,
    Seedling,
    Vegetative,
    Flowering,
    Fruiting,
    HarvestReady,
    Harvested,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PodStatus {
    #[default]
    Empty,
    Planted,
    Growing,
    Harvesting,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskType {
    Harvest,
    Prune,
    Transplant,
    ThinSeedlings,
    NutrientRefill,
    PhCheck,
    EcCheck,
    WaterChange,
    Cleaning,
    FilterChange,
    PumpMaintenance,
    TemperatureCheck,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
    Overdue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskScope {
    Seed,
    Garden,
    Pod,
}

/// Seed variety catalog entry with its expected growth parameters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Seed {
    pub id: String,
    pub name: String,
    pub seed_type: SeedType,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    pub germination_days: i64,
    pub days_to_harvest: i64,
    pub optimal_ph_min: Option<f64>,
    pub optimal_ph_max: Option<f64>,
    pub optimal_ec_min: Option<f64>,
    pub optimal_ec_max: Option<f64>,
    pub optimal_temp_c_min: Option<f64>,
    pub optimal_temp_c_max: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One concrete planting of a seed variety, tracked through growth stages.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeedBatch {
    pub id: String,
    pub seed_id: String,
    pub batch_number: Option<String>,
    pub germination_start_date: NaiveDate,
    pub actual_germination_date: Option<NaiveDate>,
    pub current_stage: GrowthStage,
    pub predicted_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GrowthLogEntry {
    pub id: String,
    pub seed_batch_id: String,
    pub timestamp: DateTime<Utc>,
    pub observation: Option<String>,
    pub height_cm: Option<f64>,
    pub leaf_count: Option<i64>,
    pub photo_urls: Json<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Hydroponic system with a fixed number of growing pods.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Garden {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_pods: i64,
    pub system_type: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One growing slot within a garden, optionally occupied by a seed batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GardenPod {
    pub id: String,
    pub garden_id: String,
    pub pod_number: i64,
    pub name: Option<String>,
    pub status: PodStatus,
    pub seed_batch_id: Option<String>,
    pub planted_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GardenEnvironmentLog {
    pub id: String,
    pub garden_id: String,
    pub timestamp: DateTime<Utc>,
    pub ph_level: Option<f64>,
    pub ec_level: Option<f64>,
    pub water_temp_c: Option<f64>,
    pub dissolved_oxygen: Option<f64>,
    pub air_temp_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub light_intensity_lux: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Scheduled actionable item scoped to a seed batch, garden, or pod.
///
/// `reminder_minutes_before` and the recurrence fields are stored but not
/// consumed anywhere; no dispatcher exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub task_type: TaskType,
    pub scope: TaskScope,
    pub title: String,
    pub description: Option<String>,
    pub seed_batch_id: Option<String>,
    pub garden_id: Option<String>,
    pub pod_id: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub reminder_sent: bool,
    pub reminder_minutes_before: i64,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
    pub recurrence_interval: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Time-triggered notification tied to a task or a seed batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: String,
    pub task_id: Option<String>,
    pub seed_batch_id: Option<String>,
    pub reminder_type: String,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
