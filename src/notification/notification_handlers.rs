use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use super::{notification_dto::SweepResponse, notification_models::Notification};
use crate::{error::Result, middleware::AuthUser, state::AppState};

/// Get all notifications for the authenticated user, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "List of notifications", body = Vec<Notification>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .notification_service
        .list_notifications(user_id)
        .await?;

    Ok(Json(notifications))
}

/// Subscribe to newly created notifications via Server-Sent Events
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "SSE stream of notifications"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn notification_stream(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let rx = state.notification_service.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(notification) if notification.user_id == user_id => {
            let event = Event::default()
                .event("notification")
                .json_data(&notification)
                .ok()?;
            Some(Ok(event))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Mark notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<Notification>> {
    let notification = state
        .notification_service
        .mark_as_read(user_id, notification_id)
        .await?;

    Ok(Json(notification))
}

/// Run the due-task sweep now
#[utoipa::path(
    post,
    path = "/api/notifications/check",
    responses(
        (status = 200, description = "Sweep finished", body = SweepResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn check_due_tasks(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<SweepResponse>> {
    let created = state.notification_service.run_sweep().await?;

    Ok(Json(SweepResponse {
        created: created.len(),
    }))
}
