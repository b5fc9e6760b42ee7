use crate::db::{new_id, DbPool, Garden};
use crate::error::{ApiError, ApiResult, Violations};
use crate::patch::Patch;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct GardenCreate {
    pub name: String,
    pub description: Option<String>,
    pub total_pods: i64,
    pub system_type: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GardenUpdate {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    pub total_pods: Option<i64>,
    #[serde(default)]
    pub system_type: Patch<String>,
    #[serde(default)]
    pub location: Patch<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl GardenUpdate {
    pub fn apply(self, garden: &mut Garden) {
        if let Some(name) = self.name {
            garden.name = name;
        }
        self.description.apply_to(&mut garden.description);
        if let Some(total) = self.total_pods {
            garden.total_pods = total;
        }
        self.system_type.apply_to(&mut garden.system_type);
        self.location.apply_to(&mut garden.location);
        if let Some(active) = self.is_active {
            garden.is_active = active;
        }
        self.notes.apply_to(&mut garden.notes);
    }
}

pub(crate) fn validate_garden(garden: &Garden) -> ApiResult<()> {
    let mut v = Violations::new();
    if garden.name.trim().is_empty() {
        v.add("name", "must not be empty");
    }
    if garden.total_pods <= 0 {
        v.add("total_pods", "must be > 0");
    }
    v.check()
}

pub async fn list_gardens_internal(pool: &DbPool) -> ApiResult<Vec<Garden>> {
    Ok(
        sqlx::query_as::<_, Garden>("SELECT * FROM gardens ORDER BY created_at ASC, id ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_garden_internal(pool: &DbPool, id: &str) -> ApiResult<Garden> {
    sqlx::query_as::<_, Garden>("SELECT * FROM gardens WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("garden", id))
}

pub async fn create_garden_internal(pool: &DbPool, payload: GardenCreate) -> ApiResult<Garden> {
    let now = Utc::now();
    let garden = Garden {
        id: new_id("garden"),
        name: payload.name,
        description: payload.description,
        total_pods: payload.total_pods,
        system_type: payload.system_type,
        location: payload.location,
        is_active: true,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };
    validate_garden(&garden)?;

    sqlx::query(
        "INSERT INTO gardens (id, name, description, total_pods, system_type, location, \
         is_active, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&garden.id)
    .bind(&garden.name)
    .bind(&garden.description)
    .bind(garden.total_pods)
    .bind(&garden.system_type)
    .bind(&garden.location)
    .bind(garden.is_active)
    .bind(&garden.notes)
    .bind(garden.created_at)
    .bind(garden.updated_at)
    .execute(pool)
    .await?;

    Ok(garden)
}

pub async fn update_garden_internal(
    pool: &DbPool,
    id: &str,
    patch: GardenUpdate,
) -> ApiResult<Garden> {
    let mut tx = pool.begin().await?;

    let mut garden = sqlx::query_as::<_, Garden>("SELECT * FROM gardens WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("garden", id))?;

    patch.apply(&mut garden);
    garden.updated_at = Utc::now();
    validate_garden(&garden)?;

    // Shrinking capacity below the pods already placed would break the
    // occupancy invariant.
    let pod_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM garden_pods WHERE garden_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if pod_count > garden.total_pods {
        return Err(ApiError::Conflict(format!(
            "garden {} already has {} pods; total_pods cannot be {}",
            id, pod_count, garden.total_pods
        )));
    }

    sqlx::query(
        "UPDATE gardens SET name = ?, description = ?, total_pods = ?, system_type = ?, \
         location = ?, is_active = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&garden.name)
    .bind(&garden.description)
    .bind(garden.total_pods)
    .bind(&garden.system_type)
    .bind(&garden.location)
    .bind(garden.is_active)
    .bind(&garden.notes)
    .bind(garden.updated_at)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(garden)
}

/// Removes the garden together with its pods and environment logs in one
/// transaction.
pub async fn delete_garden_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM garden_pods WHERE garden_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM garden_environment_logs WHERE garden_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let res = sqlx::query("DELETE FROM gardens WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("garden", id));
    }

    tx.commit().await?;
    Ok(())
}

pub async fn list_gardens(State(pool): State<DbPool>) -> ApiResult<Json<Vec<Garden>>> {
    Ok(Json(list_gardens_internal(&pool).await?))
}

pub async fn create_garden(
    State(pool): State<DbPool>,
    Json(payload): Json<GardenCreate>,
) -> ApiResult<(StatusCode, Json<Garden>)> {
    let garden = create_garden_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(garden)))
}

pub async fn get_garden(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Garden>> {
    Ok(Json(get_garden_internal(&pool, &id).await?))
}

pub async fn update_garden(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
    Json(patch): Json<GardenUpdate>,
) -> ApiResult<Json<Garden>> {
    Ok(Json(update_garden_internal(&pool, &id, patch).await?))
}

pub async fn delete_garden(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_garden_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
