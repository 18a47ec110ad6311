use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use super::{
    task_dto::{CreateTaskRequest, UpdateTaskRequest},
    task_models::Task,
};
use crate::{error::Result, middleware::AuthUser, state::AppState};

/// Get all tasks for the authenticated user
///
/// Ordered by due date (soonest first), then priority (highest first),
/// then creation time (newest first).
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "List of tasks", body = Vec<Task>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn get_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Task>>> {
    let tasks = state.task_service.list_tasks(user_id).await?;
    Ok(Json(tasks))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let task = state.task_service.create_task(user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a single task
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>> {
    let task = state.task_service.get_task(user_id, task_id).await?;
    Ok(Json(task))
}

/// Replace a task's mutable fields
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Task not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    payload.validate()?;

    let task = state
        .task_service
        .update_task(user_id, task_id, payload)
        .await?;

    Ok(Json(task))
}

/// Delete a task and its notifications
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<StatusCode> {
    state.task_service.delete_task(user_id, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
