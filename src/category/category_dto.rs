use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Moves a task into another category; `null` detaches it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReassignCategoryRequest {
    pub category_id: Option<i64>,
}
