use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::dto::{CreateTask, UpdateTask};
use super::model::{OverdueTask, Task, Toggled};
use super::{parse_due_date, parse_priority, validate_title, TASK_NOT_FOUND};
use crate::error::AppError;

pub async fn create_task(
    pool: &SqlitePool,
    user_id: Uuid,
    input: &CreateTask,
    now: DateTime<Utc>,
) -> Result<Task, AppError> {
    validate_title(&input.title)?;
    let due_date = parse_due_date(&input.due_date)?;
    let priority = parse_priority(input.priority.as_deref());

    let rec = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, 0, NULL, $7)
        RETURNING id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&input.title)
    .bind(input.description.as_deref().unwrap_or(""))
    .bind(due_date)
    .bind(priority.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!(task_id = %rec.id, %user_id, "task created");

    Ok(rec)
}

pub async fn get_task(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.to_string()))
}

/// Dashboard ordering: priority rank, then due date, then newest first.
pub async fn list_tasks(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Task>, AppError> {
    let rec = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        FROM tasks
        WHERE user_id = $1
        ORDER BY
            CASE priority
                WHEN 'High' THEN 1
                WHEN 'Medium' THEN 2
                WHEN 'Low' THEN 3
                ELSE 4
            END,
            due_date ASC,
            created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rec)
}

pub async fn list_by_date_range(
    pool: &SqlitePool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Task>, AppError> {
    let rec = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        FROM tasks
        WHERE user_id = $1 AND due_date BETWEEN $2 AND $3
        ORDER BY due_date ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rec)
}

pub async fn list_overdue(
    pool: &SqlitePool,
    user_id: Uuid,
    as_of: NaiveDate,
) -> Result<Vec<Task>, AppError> {
    let rec = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        FROM tasks
        WHERE user_id = $1 AND due_date < $2 AND is_completed = 0
        ORDER BY due_date ASC
        "#,
    )
    .bind(user_id)
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(rec)
}

pub async fn list_today(
    pool: &SqlitePool,
    user_id: Uuid,
    as_of: NaiveDate,
) -> Result<Vec<Task>, AppError> {
    let rec = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        FROM tasks
        WHERE user_id = $1 AND due_date = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(rec)
}

/// Replaces the editable fields of a task.
///
/// Completion is handled like [`toggle_completion`]: becoming complete stamps
/// `now`, staying complete keeps the original stamp, becoming incomplete
/// clears it. `is_completed: None` leaves completion as it was.
pub async fn update_task(
    pool: &SqlitePool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateTask,
    now: DateTime<Utc>,
) -> Result<Task, AppError> {
    validate_title(&input.title)?;
    let due_date = parse_due_date(&input.due_date)?;
    let priority = parse_priority(input.priority.as_deref());

    let rec = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET
            title = $3,
            description = $4,
            due_date = $5,
            priority = $6,
            is_completed = COALESCE($7, is_completed),
            completed_at = CASE
                WHEN COALESCE($7, is_completed) THEN COALESCE(completed_at, $8)
                ELSE NULL
            END
        WHERE id = $2 AND user_id = $1
        RETURNING id, user_id, title, description, due_date, priority, is_completed, completed_at, created_at
        "#,
    )
    .bind(user_id)
    .bind(id)
    .bind(&input.title)
    .bind(input.description.as_deref().unwrap_or(""))
    .bind(due_date)
    .bind(priority.as_str())
    .bind(input.is_completed)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    rec.ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.to_string()))
}

pub async fn toggle_completion(
    pool: &SqlitePool,
    user_id: Uuid,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Toggled, AppError> {
    let rec = sqlx::query_as::<_, Toggled>(
        r#"
        UPDATE tasks
        SET
            is_completed = NOT is_completed,
            completed_at = CASE WHEN is_completed THEN NULL ELSE $3 END
        WHERE id = $2 AND user_id = $1
        RETURNING id, is_completed, completed_at
        "#,
    )
    .bind(user_id)
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    rec.ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.to_string()))
}

pub async fn delete_task(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<Uuid, AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(TASK_NOT_FOUND.to_string()));
    }

    Ok(id)
}

/// Every incomplete task due before `as_of`, across all owners.
pub async fn find_all_overdue(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> Result<Vec<OverdueTask>, sqlx::Error> {
    sqlx::query_as::<_, OverdueTask>(
        r#"
        SELECT t.id, t.title, t.description, t.due_date, u.username, u.email
        FROM tasks t
        JOIN users u ON t.user_id = u.id
        WHERE t.due_date < $1 AND t.is_completed = 0
        ORDER BY t.due_date ASC
        "#,
    )
    .bind(as_of)
    .fetch_all(pool)
    .await
}
