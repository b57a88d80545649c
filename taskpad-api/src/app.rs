/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskpad_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskpad_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Configured webhook secret, if any
    pub fn webhook_secret(&self) -> Option<&str> {
        self.config.webhook.secret.as_deref()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                 # Health check (public)
/// └── /api/
///     ├── /tasks              # Task Service API
///     │   ├── GET     ?user_id=   # List tasks, newest first
///     │   ├── POST                # Create task
///     │   ├── PATCH               # Partial update
///     │   └── DELETE  ?id=        # Delete task
///     ├── /users
///     │   ├── POST                # Get-or-create by email
///     │   └── PATCH               # Link phone number
///     └── /webhook
///         ├── GET                 # Connectivity check
///         └── POST                # Action-tagged ingestion payload
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let task_routes = Router::new().route(
        "/",
        get(routes::tasks::list_tasks)
            .post(routes::tasks::create_task)
            .patch(routes::tasks::update_task)
            .delete(routes::tasks::delete_task),
    );

    let user_routes = Router::new().route(
        "/",
        axum::routing::post(routes::users::get_or_create_user).patch(routes::users::update_phone),
    );

    let webhook_routes = Router::new().route(
        "/",
        get(routes::webhook::webhook_status).post(routes::webhook::handle_webhook),
    );

    let api_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .nest("/webhook", webhook_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
