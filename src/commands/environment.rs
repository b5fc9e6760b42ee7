use crate::commands::garden::get_garden_internal;
use crate::db::{new_id, DbPool, GardenEnvironmentLog};
use crate::error::{ApiError, ApiResult, Violations};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct EnvironmentLogCreate {
    pub timestamp: Option<DateTime<Utc>>,
    pub ph_level: Option<f64>,
    pub ec_level: Option<f64>,
    pub water_temp_c: Option<f64>,
    pub dissolved_oxygen: Option<f64>,
    pub air_temp_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub light_intensity_lux: Option<i64>,
    pub notes: Option<String>,
}

pub(crate) fn validate_environment_log(log: &GardenEnvironmentLog) -> ApiResult<()> {
    let mut v = Violations::new();
    if let Some(humidity) = log.humidity_percent {
        if !(0.0..=100.0).contains(&humidity) {
            v.add("humidity_percent", "must be between 0 and 100");
        }
    }
    if let Some(lux) = log.light_intensity_lux {
        if lux < 0 {
            v.add("light_intensity_lux", "must be >= 0");
        }
    }
    v.check()
}

pub async fn list_environment_logs_internal(
    pool: &DbPool,
    garden_id: &str,
) -> ApiResult<Vec<GardenEnvironmentLog>> {
    get_garden_internal(pool, garden_id).await?;

    Ok(sqlx::query_as::<_, GardenEnvironmentLog>(
        "SELECT * FROM garden_environment_logs WHERE garden_id = ? \
         ORDER BY timestamp DESC, id DESC",
    )
    .bind(garden_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_environment_log_internal(
    pool: &DbPool,
    id: &str,
) -> ApiResult<GardenEnvironmentLog> {
    sqlx::query_as::<_, GardenEnvironmentLog>("SELECT * FROM garden_environment_logs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("environment log", id))
}

pub async fn create_environment_log_internal(
    pool: &DbPool,
    garden_id: &str,
    payload: EnvironmentLogCreate,
) -> ApiResult<GardenEnvironmentLog> {
    let garden = get_garden_internal(pool, garden_id).await?;

    let now = Utc::now();
    let log = GardenEnvironmentLog {
        id: new_id("envlog"),
        garden_id: garden.id,
        timestamp: payload.timestamp.unwrap_or(now),
        ph_level: payload.ph_level,
        ec_level: payload.ec_level,
        water_temp_c: payload.water_temp_c,
        dissolved_oxygen: payload.dissolved_oxygen,
        air_temp_c: payload.air_temp_c,
        humidity_percent: payload.humidity_percent,
        light_intensity_lux: payload.light_intensity_lux,
        notes: payload.notes,
        created_at: now,
    };
    validate_environment_log(&log)?;

    sqlx::query(
        "INSERT INTO garden_environment_logs (id, garden_id, timestamp, ph_level, ec_level, \
         water_temp_c, dissolved_oxygen, air_temp_c, humidity_percent, light_intensity_lux, \
         notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&log.id)
    .bind(&log.garden_id)
    .bind(log.timestamp)
    .bind(log.ph_level)
    .bind(log.ec_level)
    .bind(log.water_temp_c)
    .bind(log.dissolved_oxygen)
    .bind(log.air_temp_c)
    .bind(log.humidity_percent)
    .bind(log.light_intensity_lux)
    .bind(&log.notes)
    .bind(log.created_at)
    .execute(pool)
    .await?;

    Ok(log)
}

pub async fn delete_environment_log_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM garden_environment_logs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("environment log", id));
    }
    Ok(())
}

pub async fn list_environment_logs(
    State(pool): State<DbPool>,
    Path(garden_id): Path<String>,
) -> ApiResult<Json<Vec<GardenEnvironmentLog>>> {
    Ok(Json(
        list_environment_logs_internal(&pool, &garden_id).await?,
    ))
}

pub async fn create_environment_log(
    State(pool): State<DbPool>,
    Path(garden_id): Path<String>,
    Json(payload): Json<EnvironmentLogCreate>,
) -> ApiResult<(StatusCode, Json<GardenEnvironmentLog>)> {
    let log = create_environment_log_internal(&pool, &garden_id, payload).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn get_environment_log(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<GardenEnvironmentLog>> {
    Ok(Json(get_environment_log_internal(&pool, &id).await?))
}

pub async fn delete_environment_log(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_environment_log_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
