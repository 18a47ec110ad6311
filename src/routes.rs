use crate::{
    auth::{auth_handlers, AuthResponse, LoginRequest, RegisterRequest},
    category::{category_handlers, Category, CreateCategoryRequest, ReassignCategoryRequest},
    middleware::auth_middleware,
    notification::{notification_handlers, Notification, SweepResponse},
    state::AppState,
    task::{task_handlers, CreateTaskRequest, Task, TaskPriority, UpdateTaskRequest},
    user::{user_handlers, UserId, UserResponse},
};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::register,
        auth_handlers::login,
        user_handlers::get_current_user,
        user_handlers::delete_current_user,
        task_handlers::get_tasks,
        task_handlers::get_task,
        task_handlers::create_task,
        task_handlers::update_task,
        task_handlers::delete_task,
        category_handlers::reassign_task_category,
        category_handlers::create_category,
        category_handlers::get_categories,
        category_handlers::delete_category,
        category_handlers::get_category_tasks,
        notification_handlers::get_notifications,
        notification_handlers::notification_stream,
        notification_handlers::mark_notification_read,
        notification_handlers::check_due_tasks,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserId,
            UserResponse,
            CreateTaskRequest,
            UpdateTaskRequest,
            Task,
            TaskPriority,
            CreateCategoryRequest,
            ReassignCategoryRequest,
            Category,
            Notification,
            SweepResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Account endpoints"),
        (name = "tasks", description = "Task management endpoints"),
        (name = "categories", description = "Category management endpoints"),
        (name = "notifications", description = "Notification endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let auth_routes = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login));

    // Protected routes (auth required)
    let user_routes = Router::new().route(
        "/me",
        get(user_handlers::get_current_user).delete(user_handlers::delete_current_user),
    );

    let task_routes = Router::new()
        .route(
            "/",
            get(task_handlers::get_tasks).post(task_handlers::create_task),
        )
        .route(
            "/:id",
            get(task_handlers::get_task)
                .put(task_handlers::update_task)
                .delete(task_handlers::delete_task),
        )
        .route(
            "/:id/category",
            put(category_handlers::reassign_task_category),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(category_handlers::get_categories).post(category_handlers::create_category),
        )
        .route("/:id", delete(category_handlers::delete_category))
        .route("/:id/tasks", get(category_handlers::get_category_tasks));

    let notification_routes = Router::new()
        .route("/", get(notification_handlers::get_notifications))
        .route("/stream", get(notification_handlers::notification_stream))
        .route("/check", post(notification_handlers::check_due_tasks))
        .route(
            "/:id/read",
            post(notification_handlers::mark_notification_read),
        );

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .nest("/notifications", notification_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
