use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::dto::{CreateTask, DateRange, DeleteResponse, ToggleResponse, UpdateTask};
use super::{parse_due_date, parse_task_id, queries};
use crate::error::AppError;
use crate::routes::middleware_auth::CurrentUser;
use crate::state::AppState;

/// List all tasks in dashboard order
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let tasks = queries::list_tasks(&state.db, user_id).await?;
    Ok(Json(tasks))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let task = queries::create_task(&state.db, user_id, &body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_task_id(&id)?;
    let task = queries::get_task(&state.db, user_id, id).await?;
    Ok(Json(task))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_task_id(&id)?;
    let Json(body) = payload?;
    let task = queries::update_task(&state.db, user_id, id, &body, Utc::now()).await?;
    Ok(Json(task))
}

pub async fn toggle(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_task_id(&id)?;
    let toggled = queries::toggle_completion(&state.db, user_id, id, Utc::now()).await?;
    tracing::debug!(task_id = %toggled.id, completed_at = ?toggled.completed_at, "completion toggled");

    let message = if toggled.is_completed {
        "Task marked as completed"
    } else {
        "Task marked as incomplete"
    };

    Ok(Json(ToggleResponse {
        id: toggled.id,
        is_completed: toggled.is_completed,
        message,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_task_id(&id)?;
    let deleted_id = queries::delete_task(&state.db, user_id, id).await?;
    Ok(Json(DeleteResponse {
        message: "Task deleted successfully",
        deleted_id,
    }))
}

/// Tasks due within an inclusive date range
pub async fn range(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<DateRange>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(start), Some(end)) = (params.start_date, params.end_date) else {
        return Err(AppError::Validation(
            "Start date and end date are required".to_string(),
        ));
    };

    let start = parse_due_date(&start)?;
    let end = parse_due_date(&end)?;

    let tasks = queries::list_by_date_range(&state.db, user_id, start, end).await?;
    Ok(Json(tasks))
}

pub async fn overdue(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let tasks = queries::list_overdue(&state.db, user_id, today).await?;
    Ok(Json(tasks))
}

pub async fn today(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let tasks = queries::list_today(&state.db, user_id, today).await?;
    Ok(Json(tasks))
}
