use crate::db::{new_id, DbPool, Reminder};
use crate::error::{ApiError, ApiResult, Violations};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ReminderCreate {
    pub task_id: Option<String>,
    pub seed_batch_id: Option<String>,
    pub reminder_type: String,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReminderFilter {
    pub task_id: Option<String>,
    pub seed_batch_id: Option<String>,
}

pub(crate) fn validate_reminder(reminder: &Reminder) -> ApiResult<()> {
    let mut v = Violations::new();
    match (&reminder.task_id, &reminder.seed_batch_id) {
        (Some(_), Some(_)) => v.add("task_id", "task_id and seed_batch_id are mutually exclusive"),
        (None, None) => v.add("task_id", "either task_id or seed_batch_id must be set"),
        _ => {}
    }
    if reminder.reminder_type.trim().is_empty() {
        v.add("reminder_type", "must not be empty");
    }
    if reminder.message.trim().is_empty() {
        v.add("message", "must not be empty");
    }
    if reminder.sent && reminder.sent_at.is_none() {
        v.add("sent_at", "required when sent");
    }
    v.check()
}

pub async fn list_reminders_internal(
    pool: &DbPool,
    filter: ReminderFilter,
) -> ApiResult<Vec<Reminder>> {
    Ok(sqlx::query_as::<_, Reminder>(
        "SELECT * FROM reminders \
         WHERE (? IS NULL OR task_id = ?) \
           AND (? IS NULL OR seed_batch_id = ?) \
         ORDER BY scheduled_time ASC, id ASC",
    )
    .bind(&filter.task_id)
    .bind(&filter.task_id)
    .bind(&filter.seed_batch_id)
    .bind(&filter.seed_batch_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_reminder_internal(pool: &DbPool, id: &str) -> ApiResult<Reminder> {
    sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("reminder", id))
}

pub async fn create_reminder_internal(
    pool: &DbPool,
    payload: ReminderCreate,
) -> ApiResult<Reminder> {
    let reminder = Reminder {
        id: new_id("reminder"),
        task_id: payload.task_id,
        seed_batch_id: payload.seed_batch_id,
        reminder_type: payload.reminder_type,
        message: payload.message,
        scheduled_time: payload.scheduled_time,
        sent: false,
        sent_at: None,
        created_at: Utc::now(),
    };
    validate_reminder(&reminder)?;

    sqlx::query(
        "INSERT INTO reminders (id, task_id, seed_batch_id, reminder_type, message, \
         scheduled_time, sent, sent_at, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&reminder.id)
    .bind(&reminder.task_id)
    .bind(&reminder.seed_batch_id)
    .bind(&reminder.reminder_type)
    .bind(&reminder.message)
    .bind(reminder.scheduled_time)
    .bind(reminder.sent)
    .bind(reminder.sent_at)
    .bind(reminder.created_at)
    .execute(pool)
    .await?;

    Ok(reminder)
}

/// Flags a reminder as delivered. Idempotent: a reminder already sent keeps
/// its original sent_at.
pub async fn mark_sent_internal(pool: &DbPool, id: &str) -> ApiResult<Reminder> {
    let mut reminder = get_reminder_internal(pool, id).await?;
    if !reminder.sent {
        reminder.sent = true;
        reminder.sent_at = Some(Utc::now());
        sqlx::query("UPDATE reminders SET sent = ?, sent_at = ? WHERE id = ?")
            .bind(reminder.sent)
            .bind(reminder.sent_at)
            .bind(id)
            .execute(pool)
            .await?;
    }
    Ok(reminder)
}

pub async fn delete_reminder_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM reminders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("reminder", id));
    }
    Ok(())
}

pub async fn list_reminders(
    State(pool): State<DbPool>,
    Query(filter): Query<ReminderFilter>,
) -> ApiResult<Json<Vec<Reminder>>> {
    Ok(Json(list_reminders_internal(&pool, filter).await?))
}

pub async fn create_reminder(
    State(pool): State<DbPool>,
    Json(payload): Json<ReminderCreate>,
) -> ApiResult<(StatusCode, Json<Reminder>)> {
    let reminder = create_reminder_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn get_reminder(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Reminder>> {
    Ok(Json(get_reminder_internal(&pool, &id).await?))
}

pub async fn mark_sent(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Reminder>> {
    Ok(Json(mark_sent_internal(&pool, &id).await?))
}

pub async fn delete_reminder(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_reminder_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
