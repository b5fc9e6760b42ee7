use crate::commands::garden::get_garden_internal;
use crate::db::{new_id, DbPool, GardenPod, PodStatus};
use crate::error::{conflict_on_unique, ApiError, ApiResult, Violations};
use crate::patch::Patch;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct PodCreate {
    pub pod_number: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub status: PodStatus,
    pub seed_batch_id: Option<String>,
    pub planted_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update; `pod_number` is immutable, it is the pod's address
/// within the garden.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodUpdate {
    #[serde(default)]
    pub name: Patch<String>,
    pub status: Option<PodStatus>,
    #[serde(default)]
    pub seed_batch_id: Patch<String>,
    #[serde(default)]
    pub planted_date: Patch<NaiveDate>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl PodUpdate {
    pub fn apply(self, pod: &mut GardenPod) {
        self.name.apply_to(&mut pod.name);
        if let Some(status) = self.status {
            pod.status = status;
        }
        self.seed_batch_id.apply_to(&mut pod.seed_batch_id);
        self.planted_date.apply_to(&mut pod.planted_date);
        self.notes.apply_to(&mut pod.notes);
    }
}

pub(crate) fn validate_pod(pod: &GardenPod) -> ApiResult<()> {
    let mut v = Violations::new();
    if pod.pod_number < 1 {
        v.add("pod_number", "must be >= 1");
    }
    if pod.seed_batch_id.is_some() && pod.status == PodStatus::Empty {
        v.add("status", "must not be empty when seed_batch_id is set");
    }
    if pod.planted_date.is_some() && pod.seed_batch_id.is_none() {
        v.add("planted_date", "requires seed_batch_id");
    }
    v.check()
}

fn pod_not_found(garden_id: &str, pod_number: i64) -> ApiError {
    ApiError::NotFound(format!("pod {} in garden {}", pod_number, garden_id))
}

pub async fn list_pods_internal(pool: &DbPool, garden_id: &str) -> ApiResult<Vec<GardenPod>> {
    get_garden_internal(pool, garden_id).await?;

    Ok(sqlx::query_as::<_, GardenPod>(
        "SELECT * FROM garden_pods WHERE garden_id = ? ORDER BY pod_number ASC",
    )
    .bind(garden_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_pod_internal(
    pool: &DbPool,
    garden_id: &str,
    pod_number: i64,
) -> ApiResult<GardenPod> {
    sqlx::query_as::<_, GardenPod>(
        "SELECT * FROM garden_pods WHERE garden_id = ? AND pod_number = ?",
    )
    .bind(garden_id)
    .bind(pod_number)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| pod_not_found(garden_id, pod_number))
}

pub async fn create_pod_internal(
    pool: &DbPool,
    garden_id: &str,
    payload: PodCreate,
) -> ApiResult<GardenPod> {
    let mut tx = pool.begin().await?;

    let garden = sqlx::query_as::<_, crate::db::Garden>("SELECT * FROM gardens WHERE id = ?")
        .bind(garden_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("garden", garden_id))?;

    let pod_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM garden_pods WHERE garden_id = ?")
        .bind(garden_id)
        .fetch_one(&mut *tx)
        .await?;
    if pod_count >= garden.total_pods {
        return Err(ApiError::Conflict(format!(
            "garden {} is at capacity ({} pods)",
            garden_id, garden.total_pods
        )));
    }

    let now = Utc::now();
    let pod = GardenPod {
        id: new_id("pod"),
        garden_id: garden.id,
        pod_number: payload.pod_number,
        name: payload.name,
        status: payload.status,
        seed_batch_id: payload.seed_batch_id,
        planted_date: payload.planted_date,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };
    validate_pod(&pod)?;

    sqlx::query(
        "INSERT INTO garden_pods (id, garden_id, pod_number, name, status, seed_batch_id, \
         planted_date, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&pod.id)
    .bind(&pod.garden_id)
    .bind(pod.pod_number)
    .bind(&pod.name)
    .bind(pod.status)
    .bind(&pod.seed_batch_id)
    .bind(pod.planted_date)
    .bind(&pod.notes)
    .bind(pod.created_at)
    .bind(pod.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        conflict_on_unique(
            e,
            &format!(
                "pod {} already exists in garden {}",
                pod.pod_number, pod.garden_id
            ),
        )
    })?;

    tx.commit().await?;
    Ok(pod)
}

pub async fn update_pod_internal(
    pool: &DbPool,
    garden_id: &str,
    pod_number: i64,
    patch: PodUpdate,
) -> ApiResult<GardenPod> {
    let mut pod = get_pod_internal(pool, garden_id, pod_number).await?;
    patch.apply(&mut pod);
    pod.updated_at = Utc::now();
    validate_pod(&pod)?;

    sqlx::query(
        "UPDATE garden_pods SET name = ?, status = ?, seed_batch_id = ?, planted_date = ?, \
         notes = ?, updated_at = ? WHERE garden_id = ? AND pod_number = ?",
    )
    .bind(&pod.name)
    .bind(pod.status)
    .bind(&pod.seed_batch_id)
    .bind(pod.planted_date)
    .bind(&pod.notes)
    .bind(pod.updated_at)
    .bind(garden_id)
    .bind(pod_number)
    .execute(pool)
    .await?;

    Ok(pod)
}

pub async fn delete_pod_internal(
    pool: &DbPool,
    garden_id: &str,
    pod_number: i64,
) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM garden_pods WHERE garden_id = ? AND pod_number = ?")
        .bind(garden_id)
        .bind(pod_number)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(pod_not_found(garden_id, pod_number));
    }
    Ok(())
}

pub async fn list_pods(
    State(pool): State<DbPool>,
    Path(garden_id): Path<String>,
) -> ApiResult<Json<Vec<GardenPod>>> {
    Ok(Json(list_pods_internal(&pool, &garden_id).await?))
}

pub async fn create_pod(
    State(pool): State<DbPool>,
    Path(garden_id): Path<String>,
    Json(payload): Json<PodCreate>,
) -> ApiResult<(StatusCode, Json<GardenPod>)> {
    let pod = create_pod_internal(&pool, &garden_id, payload).await?;
    Ok((StatusCode::CREATED, Json(pod)))
}

pub async fn get_pod(
    State(pool): State<DbPool>,
    Path((garden_id, pod_number)): Path<(String, i64)>,
) -> ApiResult<Json<GardenPod>> {
    Ok(Json(get_pod_internal(&pool, &garden_id, pod_number).await?))
}

pub async fn update_pod(
    State(pool): State<DbPool>,
    Path((garden_id, pod_number)): Path<(String, i64)>,
    Json(patch): Json<PodUpdate>,
) -> ApiResult<Json<GardenPod>> {
    Ok(Json(
        update_pod_internal(&pool, &garden_id, pod_number, patch).await?,
    ))
}

pub async fn delete_pod(
    State(pool): State<DbPool>,
    Path((garden_id, pod_number)): Path<(String, i64)>,
) -> ApiResult<Json<Value>> {
    delete_pod_internal(&pool, &garden_id, pod_number).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
