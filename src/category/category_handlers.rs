use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use super::{
    category_dto::{CreateCategoryRequest, ReassignCategoryRequest},
    category_models::Category,
};
use crate::{error::Result, middleware::AuthUser, state::AppState, task::Task};

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let category = state
        .category_service
        .create_category(user_id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// List the caller's categories, newest first
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn get_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Category>>> {
    let categories = state.category_service.list_categories(user_id).await?;
    Ok(Json(categories))
}

/// Delete a category; its tasks are kept without a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(category_id): Path<i64>,
) -> Result<StatusCode> {
    state
        .category_service
        .delete_category(user_id, category_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the tasks of a category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/tasks",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Tasks in the category", body = Vec<Task>),
        (status = 404, description = "Category not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn get_category_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<Task>>> {
    let tasks = state
        .category_service
        .list_tasks_by_category(user_id, category_id)
        .await?;

    Ok(Json(tasks))
}

/// Move a task to another category
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/category",
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    request_body = ReassignCategoryRequest,
    responses(
        (status = 204, description = "Task category updated"),
        (status = 400, description = "Unknown category"),
        (status = 404, description = "Task not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "categories",
    security(("bearer_auth" = []))
)]
pub async fn reassign_task_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
    Json(payload): Json<ReassignCategoryRequest>,
) -> Result<StatusCode> {
    state
        .category_service
        .reassign_task_category(user_id, task_id, payload.category_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
