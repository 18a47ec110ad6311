use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::{
    auth::AuthService,
    category::{CategoryRepository, CategoryService, PgCategoryRepository},
    db::{DbPool, MemoryDb},
    notification::{
        scheduler::DEFAULT_SWEEP_INTERVAL_MINUTES, NotificationRepository, NotificationService,
        PgNotificationRepository,
    },
    task::{PgTaskRepository, TaskRepository, TaskService},
    user::{PgUserRepository, UserRepository, UserService},
};

pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub task_service: TaskService,
    pub category_service: CategoryService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(config: Arc<Config>, repos: Repositories) -> Self {
        let auth_service = AuthService::new(
            repos.users.clone(),
            config.jwt_secret.clone(),
            config.jwt_expiration_hours,
            config.bcrypt_cost,
        );
        let user_service = UserService::new(repos.users);
        let task_service = TaskService::new(repos.tasks.clone(), repos.categories.clone());
        let category_service = CategoryService::new(repos.categories, repos.tasks);
        let notification_service = NotificationService::new(repos.notifications);

        Self {
            config,
            auth_service,
            user_service,
            task_service,
            category_service,
            notification_service,
        }
    }
}

/// The persistence gateway, one handle per entity.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            tasks: Arc::new(PgTaskRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    pub fn memory(db: MemoryDb) -> Self {
        Self {
            users: Arc::new(db.clone()),
            categories: Arc::new(db.clone()),
            tasks: Arc::new(db.clone()),
            notifications: Arc::new(db),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: String,
    pub port: u16,
    pub sweep_interval_minutes: u64,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T: std::str::FromStr,
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match value {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a number")),
                None => Ok(default),
            }
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration_hours: parse_or(
                lookup("JWT_EXPIRATION_HOURS"),
                "JWT_EXPIRATION_HOURS",
                24,
            )?,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(lookup("PORT"), "PORT", 8080)?,
            sweep_interval_minutes: parse_or(
                lookup("SWEEP_INTERVAL_MINUTES"),
                "SWEEP_INTERVAL_MINUTES",
                DEFAULT_SWEEP_INTERVAL_MINUTES,
            )?,
            bcrypt_cost: parse_or(lookup("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_DATABASE_URL)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.max(1) * 60)
    }
}
