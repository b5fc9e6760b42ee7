use crate::db::{new_id, DbPool, Task, TaskPriority, TaskScope, TaskStatus, TaskType};
use crate::error::{ApiError, ApiResult, Violations};
use crate::patch::Patch;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub task_type: TaskType,
    pub scope: TaskScope,
    pub title: String,
    pub description: Option<String>,
    pub seed_batch_id: Option<String>,
    pub garden_id: Option<String>,
    pub pod_id: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes_before: i64,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
    pub recurrence_interval: Option<i64>,
    pub notes: Option<String>,
}

fn default_reminder_minutes() -> i64 {
    60
}

/// Partial update; scope and the scoped reference are immutable after create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Patch<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub completed_date: Patch<DateTime<Utc>>,
    pub is_recurring: Option<bool>,
    #[serde(default)]
    pub recurrence_pattern: Patch<String>,
    #[serde(default)]
    pub recurrence_interval: Patch<i64>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl TaskUpdate {
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        self.description.apply_to(&mut task.description);
        if let Some(date) = self.scheduled_date {
            task.scheduled_date = date;
        }
        self.due_date.apply_to(&mut task.due_date);
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        self.completed_date.apply_to(&mut task.completed_date);
        if let Some(recurring) = self.is_recurring {
            task.is_recurring = recurring;
        }
        self.recurrence_pattern
            .apply_to(&mut task.recurrence_pattern);
        self.recurrence_interval
            .apply_to(&mut task.recurrence_interval);
        self.notes.apply_to(&mut task.notes);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub seed_batch_id: Option<String>,
    pub garden_id: Option<String>,
    pub pod_id: Option<String>,
    pub status: Option<TaskStatus>,
}

pub(crate) fn validate_task(task: &Task) -> ApiResult<()> {
    let mut v = Violations::new();
    if task.title.trim().is_empty() {
        v.add("title", "must not be empty");
    }

    let set = [
        task.seed_batch_id.is_some(),
        task.garden_id.is_some(),
        task.pod_id.is_some(),
    ]
    .iter()
    .filter(|b| **b)
    .count();
    if set != 1 {
        v.add(
            "scope",
            "exactly one of seed_batch_id, garden_id, pod_id must be set",
        );
    } else {
        let matches_scope = match task.scope {
            TaskScope::Seed => task.seed_batch_id.is_some(),
            TaskScope::Garden => task.garden_id.is_some(),
            TaskScope::Pod => task.pod_id.is_some(),
        };
        if !matches_scope {
            v.add("scope", "reference does not match scope");
        }
    }

    if let Some(due) = task.due_date {
        if due < task.scheduled_date {
            v.add("due_date", "must be >= scheduled_date");
        }
    }
    if task.completed_date.is_some() && task.status != TaskStatus::Completed {
        v.add("completed_date", "requires status == completed");
    }
    if task.is_recurring {
        if task.recurrence_pattern.is_none() {
            v.add("recurrence_pattern", "required when is_recurring");
        }
        match task.recurrence_interval {
            None => v.add("recurrence_interval", "required when is_recurring"),
            Some(i) if i < 1 => v.add("recurrence_interval", "must be >= 1"),
            _ => {}
        }
    }
    if task.reminder_minutes_before < 0 {
        v.add("reminder_minutes_before", "must be >= 0");
    }
    v.check()
}

pub async fn list_tasks_internal(pool: &DbPool, filter: TaskFilter) -> ApiResult<Vec<Task>> {
    Ok(sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks \
         WHERE (? IS NULL OR seed_batch_id = ?) \
           AND (? IS NULL OR garden_id = ?) \
           AND (? IS NULL OR pod_id = ?) \
           AND (? IS NULL OR status = ?) \
         ORDER BY scheduled_date ASC, id ASC",
    )
    .bind(&filter.seed_batch_id)
    .bind(&filter.seed_batch_id)
    .bind(&filter.garden_id)
    .bind(&filter.garden_id)
    .bind(&filter.pod_id)
    .bind(&filter.pod_id)
    .bind(filter.status)
    .bind(filter.status)
    .fetch_all(pool)
    .await?)
}

pub async fn get_task_internal(pool: &DbPool, id: &str) -> ApiResult<Task> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("task", id))
}

pub async fn create_task_internal(pool: &DbPool, payload: TaskCreate) -> ApiResult<Task> {
    let now = Utc::now();
    let task = Task {
        id: new_id("task"),
        task_type: payload.task_type,
        scope: payload.scope,
        title: payload.title,
        description: payload.description,
        seed_batch_id: payload.seed_batch_id,
        garden_id: payload.garden_id,
        pod_id: payload.pod_id,
        scheduled_date: payload.scheduled_date,
        due_date: payload.due_date,
        completed_date: None,
        status: TaskStatus::Pending,
        priority: payload.priority,
        reminder_sent: false,
        reminder_minutes_before: payload.reminder_minutes_before,
        is_recurring: payload.is_recurring,
        recurrence_pattern: payload.recurrence_pattern,
        recurrence_interval: payload.recurrence_interval,
        notes: payload.notes,
        created_at: now,
        updated_at: now,
    };
    validate_task(&task)?;

    sqlx::query(
        "INSERT INTO tasks (id, task_type, scope, title, description, seed_batch_id, garden_id, \
         pod_id, scheduled_date, due_date, completed_date, status, priority, reminder_sent, \
         reminder_minutes_before, is_recurring, recurrence_pattern, recurrence_interval, notes, \
         created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&task.id)
    .bind(task.task_type)
    .bind(task.scope)
    .bind(&task.title)
    .bind(&task.description)
    .bind(&task.seed_batch_id)
    .bind(&task.garden_id)
    .bind(&task.pod_id)
    .bind(task.scheduled_date)
    .bind(task.due_date)
    .bind(task.completed_date)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.reminder_sent)
    .bind(task.reminder_minutes_before)
    .bind(task.is_recurring)
    .bind(&task.recurrence_pattern)
    .bind(task.recurrence_interval)
    .bind(&task.notes)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(pool)
    .await?;

    Ok(task)
}

pub async fn update_task_internal(pool: &DbPool, id: &str, patch: TaskUpdate) -> ApiResult<Task> {
    let mut task = get_task_internal(pool, id).await?;
    patch.apply(&mut task);
    task.updated_at = Utc::now();
    validate_task(&task)?;

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, scheduled_date = ?, due_date = ?, \
         completed_date = ?, status = ?, priority = ?, is_recurring = ?, recurrence_pattern = ?, \
         recurrence_interval = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.scheduled_date)
    .bind(task.due_date)
    .bind(task.completed_date)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.is_recurring)
    .bind(&task.recurrence_pattern)
    .bind(task.recurrence_interval)
    .bind(&task.notes)
    .bind(task.updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(task)
}

pub async fn delete_task_internal(pool: &DbPool, id: &str) -> ApiResult<()> {
    let res = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(ApiError::not_found("task", id));
    }
    Ok(())
}

pub async fn list_tasks(
    State(pool): State<DbPool>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(list_tasks_internal(&pool, filter).await?))
}

pub async fn create_task(
    State(pool): State<DbPool>,
    Json(payload): Json<TaskCreate>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = create_task_internal(&pool, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(get_task_internal(&pool, &id).await?))
}

pub async fn update_task(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
    Json(patch): Json<TaskUpdate>,
) -> ApiResult<Json<Task>> {
    Ok(Json(update_task_internal(&pool, &id, patch).await?))
}

pub async fn delete_task(
    State(pool): State<DbPool>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    delete_task_internal(&pool, &id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
