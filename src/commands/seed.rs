use crate::db::{new_id, DbPool, Seed, SeedType};
use crate::error::{ApiError, ApiResult, Violations};
use crate::patch::Patch;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SeedCreate {
    pub name: String,
    pub seed_type: SeedType,
    pub variety: Option<String>,
    pub supplier: Option<String>,
    #[serde(default = "default_germination_days")]
    pub germination_days: i64,
    #[serde(default = "default_days_to_harvest")]
    pub days_to_harvest: i64,
    pub optimal_ph_min: Option<f64>,
    pub optimal_ph_max: Option<f64>,
    pub optimal_ec_min: Option<f64>,
    pub optimal_ec_max: Option<f64>,
    pub optimal_temp_c_min: Option<f64>,
    pub optimal_temp_c_max: Option<f64>,
    pub notes: Option<String>,
}

fn default_germination_days() -> i64 {
    7
}

fn default_days_to_harvest() -> i64 {
    60
}

/// Partial update; `seed_type` is immutable after create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedUpdate {
    pub name: Option<String>,
    #[serde(default)]
    pub variety: Patch<String>,
    #[serde(default)]
    pub supplier: Patch<String>,
    pub germination_days: Option<i64>,
    pub days_to_harvest: Option<i64>,
    #[serde(default)]
    pub optimal_ph_min: Patch<f64>,
    #[serde(default)]
    pub optimal_ph_max: Patch<f64>,
    #[serde(default)]
    pub optimal_ec_min: Patch<f64>,
    #[serde(default)]
    pub optimal_ec_max: Patch<f64>,
    #[serde(default)]
    pub optimal_temp_c_min: Patch<f64>,
    #[serde(default)]
    pub optimal_temp_c_max: Patch<f64>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl SeedUpdate {
    pub fn apply(self, seed: &mut Seed) {
        if let Some(name) = self.name {
            seed.name = name;
        }
        self.variety.apply_to(&mut seed.variety);
        self.supplier.apply_to(&mut seed.supplier);
        if let Some(days) = self.germination_days {
            seed.germination_days = days;
        }
        if let Some(days) = self.days_to_harvest {
            seed.days_to_harvest = days;
        }
        self.optimal_ph_min.apply_to(&mut seed.optimal_ph_min);
        self.optimal_ph_max.apply_to(&mut seed.optimal_ph_max);
        self.optimal_ec_min.apply_to(&mut seed.optimal_ec_min);
        self.optimal_ec_max.apply_to(&mut seed.optimal_ec_max);
        self.optimal_temp_c_min.apply_to(&mut seed.optimal_temp_c_min);
        self.optimal_temp_c_max.apply_to(&mut seed.optimal_temp_c_max);
        self.notes.apply_to(&mut seed.notes);
    }
}

fn check_pair(v: &mut Violations, field: &str, min: Option<f64>, max: Option<f64>) {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            v.add(
                &format!("{}_min", field),
                format!("must be <= {}_max", field),
            );
        }
    }
}

pub(crate) fn validate_seed(seed: &Seed) -> ApiResult<()> {
    let mut v = Violations::new();
    if seed.name.trim().is_empty() {
        v.add("name", "must not be empty");
    }
    if seed.germination_days < 0 {
        v.add("germination_days", "must be >= 0");
    }
    if seed.days_to_harvest < 0 {
        v.add("days_to_harvest", "must be >= 0");
    }
    check_pair(&mut v, "optimal_ph", seed.optimal_ph_min, seed.optimal_ph_max);
    check_pair(&mut v, "optimal_ec", seed.optimal_ec_min, seed.optimal_ec_max);
    check_pair(
        &mut v,
        "optimal_temp_c",
        seed.optimal_temp_c_min,
        seed.optimal_temp_c_max,
    );
    v.check()
}

pub async fn list_seeds_internal(pool: &DbPool) -> ApiResult<Vec<Seed>> {
    Ok(
        sqlx::query_as::<_, Seed>("SELECT * FROM seeds ORDER BY created_at ASC, id ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_seed_internal(pool: &DbPool, id: &str) -> ApiResult<Seed> {
    sqlx::query_as::<_, Seed>("SELECT * FROM seeds WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("seed", id))
}

pub async fn create_seed_internal(pool: &DbPool, payload: SeedCreate) -> ApiResult<Seed> {
    let now = Utc::now();
    let seed = Seed {
        id: new_id("seed"),
        name: payload.name,
        seed_type: payload.seed_type,
        variety: payload.variety,
        supplier: payload.supplier,
        germination_days: payload.germination_days,
        days_to_harvest: payload.days_to_harvest,
        optimal_ph_min: payload.optimal_ph_min,
        optimal_ph_max: payload.optimal_ph_max,
        optimal_ec_min: payload.optimal_ec_min,
        optimal_ec_max: payload.optimal_ec_max,
        optimal_temp_c_min: payload.optimal_temp_c_min,
        optimal_temp_c_max: payload.optimal_temp_c_max,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };
    validate_seed(&seed)?;

    sqlx::query(
        "INSERT INTO seeds (id, name, seed_type, variety, supplier, germination_days, days_to_harvest, \
         optimal_ph_min, optimal_ph_max, optimal_ec_min, optimal_ec_max, optimal_temp_c_min, optimal_temp_c_max, \
         notes, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&seed.id)
    .bind(&seed.name)
    .bind(seed.seed_type)
    .bind(&seed.variety)
    .bind(&seed.supplier)
    .bind(seed.germination_days)
    .bind(seed.days_to_harvest)
    .bind(seed.optimal_ph_min)
    .bind(seed.optimal_ph_max)
    .bind(seed.optimal_ec_min)
    .bind(seed.optimal_ec_max)
    .bind(seed.optimal_temp_c_min)
    .bind(seed.optimal_temp_c_max)
    .bind(&seed.notes)
    .bind(seed.created_at)
    .bind(seed.updated_at)
    .execute(pool)
    .await?;

    Ok(seed)
}

pub async fn update_seed_internal(pool: &DbPool, id: &str, patch: SeedUpdate) -> ApiResult<Seed> {
    let mut seed = get_seed_internal(pool, id).await?;
    patch.apply(&mut seed);
    seed.updated_at = Utc::now();
    validate_seed(&seed)?;

    sqlx::query(
        "UPDATE seeds SET name = ?, variety = ?, supplier = ?, germination_days = ?, days_to_harvest = ?, \
         optimal_ph_min = ?, optimal_ph_max = ?, optimal_ec_min = ?, optimal_ec_max = ?, \
         optimal_temp_c_min = ?, optimal_temp_c_max = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&seed.name)
    .bind(&seed.variety)
    .bind(&seed.supplier)
    .bind(seed.germination_days)
    .bind(seed.days_to_harvest)
    .bind(seed.optimal_ph_min)
    .bind(seed.optimal_ph_max)
    .bind(seed.optimal_ec_min)
    .bind(seed.optimal_ec_max)
    .bind(seed.optimal_temp_c_min)
    .bind(seed.optimal_temp_c_max)
    .bind(&seed.notes)
    .bind(seed.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(seed)
}

pub async fn delete_seed_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM seeds WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("seed", id));
    }
    Ok(())
}

pub async fn list_seeds(State(pool): State<DbPool>) -> ApiResult<Json<Vec<Seed>>> {
    Ok(Json(list_seeds_internal(&pool).await?))
}

pub async fn create_seed(
    State(pool): State<DbPool>,
    Json(payload): Json<SeedCreate>,
) -> ApiResult<(StatusCode, Json<Seed>)> {
    let seed = create_seed_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(seed)))
}

pub async fn get_seed(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Seed>> {
    Ok(Json(get_seed_internal(&pool, &id).await?))
}

pub async fn update_seed(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
    Json(patch): Json<SeedUpdate>,
) -> ApiResult<Json<Seed>> {
    Ok(Json(update_seed_internal(&pool, &id, patch).await?))
}

pub async fn delete_seed(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_seed_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
