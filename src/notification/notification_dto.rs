use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of notifications created by this sweep.
    pub created: usize,
}
