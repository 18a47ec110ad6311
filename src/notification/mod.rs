// Declare submodules
pub mod notification_dto;
pub mod notification_handlers;
pub mod notification_models;
pub mod notification_repository;
pub mod notification_service;
pub mod scheduler;

// Re-export public items
pub use notification_dto::SweepResponse;
pub use notification_models::{NewNotification, Notification, SweepCandidate};
pub use notification_repository::{NotificationRepository, PgNotificationRepository};
pub use notification_service::{NotificationKind, NotificationService};
pub use scheduler::start_notification_scheduler;
