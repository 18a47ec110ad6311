use std::sync::Arc;

use todo_service::{
    db::{create_pool, run_migrations, MemoryDb},
    notification::start_notification_scheduler,
    routes::create_router,
    state::{AppState, Config, Repositories},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    let repos = if config.uses_memory_store() {
        tracing::warn!("Using in-memory store, data is lost on shutdown");
        Repositories::memory(MemoryDb::new())
    } else {
        tracing::info!("Connecting to database...");
        let db = create_pool(&config.database_url, config.db_max_connections).await?;

        tracing::info!("Running migrations...");
        run_migrations(&db).await?;

        Repositories::postgres(db)
    };

    let state = AppState::new(config.clone(), repos);

    // Dropping the scheduler handle would stop the sweep
    let _scheduler = start_notification_scheduler(
        state.notification_service.clone(),
        config.sweep_interval(),
    )
    .await?;

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
