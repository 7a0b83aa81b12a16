//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::domain::repository::{
    CacheStore, CredentialStore, NotificationChannel, SessionRepository,
};
use auth::infra::memory::{MemoryCacheStore, MemoryCredentialStore, MemorySessionRepository};
use auth::{AuthSessionManager, MailChannel, PgAuthRepository, PgCacheStore, auth_router};
use axum::{
    Router,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let auth_config = Arc::new(config.auth.clone());
    let mail = Arc::new(MailChannel::from_config(config.mail.clone())?);

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores; data is lost on restart");
        let credentials = Arc::new(MemoryCredentialStore::seeded());
        let manager = AuthSessionManager::new(
            credentials,
            Arc::new(MemoryCacheStore::new()),
            Arc::new(MemorySessionRepository::new()),
            mail,
            auth_config,
        );
        return serve(manager, &config).await;
    };

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let cache = Arc::new(PgCacheStore::new(pool));

    // Startup cleanup: errors here should not prevent server startup
    if let Err(e) = repo.cleanup_expired().await {
        tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
    }
    if let Err(e) = cache.cleanup_expired().await {
        tracing::warn!(error = %e, "Cache cleanup failed, continuing anyway");
    }

    let manager = AuthSessionManager::new(repo.clone(), cache, repo, mail, auth_config);
    serve(manager, &config).await
}

async fn serve<C, K, S, N>(
    manager: AuthSessionManager<C, K, S, N>,
    config: &AppConfig,
) -> anyhow::Result<()>
where
    C: CredentialStore + Send + Sync + 'static,
    K: CacheStore + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    N: NotificationChannel + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origins.clone())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", auth_router(Arc::new(manager)))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(config.listen_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
