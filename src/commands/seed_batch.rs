use crate::commands::seed::get_seed_internal;
use crate::db::{new_id, DbPool, GrowthStage, SeedBatch};
use crate::error::{ApiError, ApiResult, Violations};
use crate::patch::Patch;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SeedBatchCreate {
    pub seed_id: String,
    pub batch_number: Option<String>,
    pub germination_start_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedBatchUpdate {
    pub current_stage: Option<GrowthStage>,
    #[serde(default)]
    pub actual_germination_date: Patch<NaiveDate>,
    #[serde(default)]
    pub actual_harvest_date: Patch<NaiveDate>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl SeedBatchUpdate {
    pub fn apply(self, batch: &mut SeedBatch) {
        if let Some(stage) = self.current_stage {
            batch.current_stage = stage;
        }
        self.actual_germination_date
            .apply_to(&mut batch.actual_germination_date);
        self.actual_harvest_date
            .apply_to(&mut batch.actual_harvest_date);
        if let Some(active) = self.is_active {
            batch.is_active = active;
        }
        self.notes.apply_to(&mut batch.notes);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedBatchFilter {
    pub seed_id: Option<String>,
}

pub(crate) fn predicted_harvest(start: NaiveDate, days_to_harvest: i64) -> NaiveDate {
    start + Duration::days(days_to_harvest)
}

pub(crate) fn validate_batch(batch: &SeedBatch) -> ApiResult<()> {
    let mut v = Violations::new();
    if let Some(date) = batch.actual_germination_date {
        if date < batch.germination_start_date {
            v.add(
                "actual_germination_date",
                "must be >= germination_start_date",
            );
        }
    }
    if let Some(date) = batch.actual_harvest_date {
        if date < batch.germination_start_date {
            v.add("actual_harvest_date", "must be >= germination_start_date");
        }
    }
    v.check()
}

pub async fn list_batches_internal(
    pool: &DbPool,
    filter: SeedBatchFilter,
) -> ApiResult<Vec<SeedBatch>> {
    Ok(sqlx::query_as::<_, SeedBatch>(
        "SELECT * FROM seed_batches \
         WHERE (? IS NULL OR seed_id = ?) \
         ORDER BY germination_start_date DESC, id ASC",
    )
    .bind(&filter.seed_id)
    .bind(&filter.seed_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_batch_internal(pool: &DbPool, id: &str) -> ApiResult<SeedBatch> {
    sqlx::query_as::<_, SeedBatch>("SELECT * FROM seed_batches WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("seed batch", id))
}

pub async fn create_batch_internal(
    pool: &DbPool,
    payload: SeedBatchCreate,
) -> ApiResult<SeedBatch> {
    // The referenced seed supplies days_to_harvest for the prediction.
    let seed = get_seed_internal(pool, &payload.seed_id).await?;

    let now = Utc::now();
    let batch = SeedBatch {
        id: new_id("batch"),
        seed_id: seed.id,
        batch_number: payload.batch_number,
        germination_start_date: payload.germination_start_date,
        actual_germination_date: None,
        current_stage: GrowthStage::Germination,
        predicted_harvest_date: Some(predicted_harvest(
            payload.germination_start_date,
            seed.days_to_harvest,
        )),
        actual_harvest_date: None,
        is_active: true,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };
    validate_batch(&batch)?;

    sqlx::query(
        "INSERT INTO seed_batches (id, seed_id, batch_number, germination_start_date, \
         actual_germination_date, current_stage, predicted_harvest_date, actual_harvest_date, \
         is_active, notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&batch.id)
    .bind(&batch.seed_id)
    .bind(&batch.batch_number)
    .bind(batch.germination_start_date)
    .bind(batch.actual_germination_date)
    .bind(batch.current_stage)
    .bind(batch.predicted_harvest_date)
    .bind(batch.actual_harvest_date)
    .bind(batch.is_active)
    .bind(&batch.notes)
    .bind(batch.created_at)
    .bind(batch.updated_at)
    .execute(pool)
    .await?;

    Ok(batch)
}

pub async fn update_batch_internal(
    pool: &DbPool,
    id: &str,
    patch: SeedBatchUpdate,
) -> ApiResult<SeedBatch> {
    let mut batch = get_batch_internal(pool, id).await?;
    patch.apply(&mut batch);
    batch.updated_at = Utc::now();
    validate_batch(&batch)?;

    sqlx::query(
        "UPDATE seed_batches SET current_stage = ?, actual_germination_date = ?, \
         actual_harvest_date = ?, is_active = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(batch.current_stage)
    .bind(batch.actual_germination_date)
    .bind(batch.actual_harvest_date)
    .bind(batch.is_active)
    .bind(&batch.notes)
    .bind(batch.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(batch)
}

pub async fn delete_batch_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM seed_batches WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("seed batch", id));
    }
    Ok(())
}

pub async fn list_batches(
    State(pool): State<DbPool>,
    Query(filter): Query<SeedBatchFilter>,
) -> ApiResult<Json<Vec<SeedBatch>>> {
    Ok(Json(list_batches_internal(&pool, filter).await?))
}

pub async fn create_batch(
    State(pool): State<DbPool>,
    Json(payload): Json<SeedBatchCreate>,
) -> ApiResult<(StatusCode, Json<SeedBatch>)> {
    let batch = create_batch_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn get_batch(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<SeedBatch>> {
    Ok(Json(get_batch_internal(&pool, &id).await?))
}

pub async fn update_batch(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
    Json(patch): Json<SeedBatchUpdate>,
) -> ApiResult<Json<SeedBatch>> {
    Ok(Json(update_batch_internal(&pool, &id, patch).await?))
}

pub async fn delete_batch(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_batch_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
