use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    /// RFC 3339 timestamp, zone-less timestamp or `YYYY-MM-DD`; defaults to now.
    pub due_date: Option<String>,
    /// `low`, `medium` or `high`; defaults to `low`.
    pub priority: Option<String>,
    pub category_id: Option<i64>,
}

/// Full replacement of a task's mutable fields.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub due_date: String,
    pub priority: String,
    pub category_id: Option<i64>,
}
