pub mod due_date;
pub mod task_dto;
pub mod task_handlers;
pub mod task_models;
pub mod task_repository;
pub mod task_service;

pub use due_date::parse_due_date;
pub use task_dto::{CreateTaskRequest, UpdateTaskRequest};
pub use task_models::{NewTask, Task, TaskChanges, TaskPriority};
pub use task_repository::{PgTaskRepository, TaskRepository};
pub use task_service::TaskService;
