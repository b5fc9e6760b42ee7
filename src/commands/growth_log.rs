use crate::commands::seed_batch::get_batch_internal;
use crate::db::{new_id, DbPool, GrowthLogEntry};
use crate::error::{ApiError, ApiResult, Violations};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::types::Json as SqlJson;

#[derive(Debug, Deserialize)]
pub struct GrowthLogCreate {
    pub timestamp: Option<DateTime<Utc>>,
    pub observation: Option<String>,
    pub height_cm: Option<f64>,
    pub leaf_count: Option<i64>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub notes: Option<String>,
}

pub(crate) fn validate_growth_log(entry: &GrowthLogEntry) -> ApiResult<()> {
    let mut v = Violations::new();
    if let Some(height) = entry.height_cm {
        if height < 0.0 {
            v.add("height_cm", "must be >= 0");
        }
    }
    if let Some(count) = entry.leaf_count {
        if count < 0 {
            v.add("leaf_count", "must be >= 0");
        }
    }
    v.check()
}

pub async fn list_growth_logs_internal(
    pool: &DbPool,
    seed_batch_id: &str,
) -> ApiResult<Vec<GrowthLogEntry>> {
    // 404 for an unknown batch rather than an empty list.
    get_batch_internal(pool, seed_batch_id).await?;

    Ok(sqlx::query_as::<_, GrowthLogEntry>(
        "SELECT * FROM growth_log_entries WHERE seed_batch_id = ? \
         ORDER BY timestamp DESC, id DESC",
    )
    .bind(seed_batch_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_growth_log_internal(pool: &DbPool, id: &str) -> ApiResult<GrowthLogEntry> {
    sqlx::query_as::<_, GrowthLogEntry>("SELECT * FROM growth_log_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("growth log", id))
}

pub async fn create_growth_log_internal(
    pool: &DbPool,
    seed_batch_id: &str,
    payload: GrowthLogCreate,
) -> ApiResult<GrowthLogEntry> {
    let batch = get_batch_internal(pool, seed_batch_id).await?;

    let now = Utc::now();
    let entry = GrowthLogEntry {
        id: new_id("log"),
        seed_batch_id: batch.id,
        timestamp: payload.timestamp.unwrap_or(now),
        observation: payload.observation,
        height_cm: payload.height_cm,
        leaf_count: payload.leaf_count,
        photo_urls: SqlJson(payload.photo_urls),
        notes: payload.notes,
        created_at: now,
    };
    validate_growth_log(&entry)?;

    sqlx::query(
        "INSERT INTO growth_log_entries (id, seed_batch_id, timestamp, observation, height_cm, \
         leaf_count, photo_urls, notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.id)
    .bind(&entry.seed_batch_id)
    .bind(entry.timestamp)
    .bind(&entry.observation)
    .bind(entry.height_cm)
    .bind(entry.leaf_count)
    .bind(&entry.photo_urls)
    .bind(&entry.notes)
    .bind(entry.created_at)
    .execute(pool)
    .await?;

    Ok(entry)
}

pub async fn delete_growth_log_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM growth_log_entries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("growth log", id));
    }
    Ok(())
}

pub async fn list_growth_logs(
    State(pool): State<DbPool>,
    Path(seed_batch_id): Path<String>,
) -> ApiResult<Json<Vec<GrowthLogEntry>>> {
    Ok(Json(list_growth_logs_internal(&pool, &seed_batch_id).await?))
}

pub async fn create_growth_log(
    State(pool): State<DbPool>,
    Path(seed_batch_id): Path<String>,
    Json(payload): Json<GrowthLogCreate>,
) -> ApiResult<(StatusCode, Json<GrowthLogEntry>)> {
    let entry = create_growth_log_internal(&pool, &seed_batch_id, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_growth_log(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<GrowthLogEntry>> {
    Ok(Json(get_growth_log_internal(&pool, &id).await?))
}

pub async fn delete_growth_log(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_growth_log_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
