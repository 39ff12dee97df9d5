//! Assistant Platform Backend
//!
//! Multi-tenant virtual-assistant SaaS backend.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Storage: injected data access (Postgres or in-memory)
//! - Sessions: injected session store (Postgres, Redis, or in-memory)

use anyhow::Result;
use assistant_platform_backend::auth::{
    MemorySessionStore, PgSessionStore, RedisSessionStore, SessionStore,
};
use assistant_platform_backend::llm::LlmClient;
use assistant_platform_backend::repositories::{MemoryStorage, PgStorage, Storage};
use assistant_platform_backend::services::AdminService;
use assistant_platform_backend::{config, db, routes, state::AppState};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often the expired-session sweeper runs
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Assistant Platform Backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Select the storage and session backends
    let (storage, sessions) = build_backends(&config).await?;

    // Outbound LLM client
    let llm = Arc::new(LlmClient::new(&config.llm)?);

    // First-admin bootstrap (idempotent)
    if let Some(admin) = &config.admin {
        AdminService::bootstrap_admin(storage.as_ref(), &admin.username, &admin.password)
            .await
            .map_err(|e| anyhow::anyhow!("Admin bootstrap failed: {}", e))?;
    }

    // Periodic expired-session sweep
    tokio::spawn(session_sweeper(sessions.clone()));

    // Create application state and router
    let state = AppState::new(storage, sessions, llm, config.clone());
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Instantiate the storage and session backends named by the configuration
async fn build_backends(
    config: &config::AppConfig,
) -> Result<(Arc<dyn Storage>, Arc<dyn SessionStore>)> {
    match config.storage.backend.as_str() {
        "memory" => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            Ok((
                Arc::new(MemoryStorage::new()),
                Arc::new(MemorySessionStore::new()),
            ))
        }
        "postgres" => {
            info!("Connecting to database...");
            let pool =
                db::create_pool(&config.database.url, config.database.max_connections).await?;

            // Run migrations (skip in production if using a separate migration job)
            if !config::AppConfig::is_production() {
                db::run_migrations(&pool).await?;
            }

            let sessions: Arc<dyn SessionStore> = if config.redis.enabled {
                match connect_redis(&config.redis.url).await {
                    Some(conn) => Arc::new(RedisSessionStore::new(conn)),
                    None => Arc::new(PgSessionStore::new(pool.clone())),
                }
            } else {
                Arc::new(PgSessionStore::new(pool.clone()))
            };

            Ok((Arc::new(PgStorage::new(pool)), sessions))
        }
        other => anyhow::bail!("Unknown storage backend: {}", other),
    }
}

/// Connect to Redis with graceful fallback
///
/// Returns None if Redis is unavailable; sessions then live in Postgres.
async fn connect_redis(url: &str) -> Option<ConnectionManager> {
    info!("Connecting to Redis...");

    match redis::Client::open(url) {
        Ok(client) => match ConnectionManager::new(client).await {
            Ok(conn) => {
                info!("Redis connection established");
                Some(conn)
            }
            Err(e) => {
                warn!(
                    "Failed to connect to Redis: {}. Falling back to database sessions.",
                    e
                );
                None
            }
        },
        Err(e) => {
            warn!("Invalid Redis URL: {}. Falling back to database sessions.", e);
            None
        }
    }
}

/// Periodically drop expired sessions
async fn session_sweeper(sessions: Arc<dyn SessionStore>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        match sessions.delete_expired().await {
            Ok(0) => {}
            Ok(n) => info!(count = n, "Swept expired sessions"),
            Err(e) => warn!("Session sweep failed: {}", e),
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "assistant_platform_backend=info,tower_http=info".into()
        } else {
            "assistant_platform_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.storage.backend == "memory" {
        errors.push("In-memory storage cannot be used in production");
    }

    if let Some(admin) = &config.admin {
        if admin.password.len() < 12 {
            errors.push("Admin bootstrap password must be at least 12 characters");
        }
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if config.session.cookie_secure == Some(false) {
        warn!("Session cookie Secure attribute is disabled in production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
