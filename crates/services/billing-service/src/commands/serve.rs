//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, EmailDelivery, JOB_WORKER_MAX_CONNECTIONS};
use crate::infra::{Cache, Database};
use crate::notifications::{build_mailer, Email, Mailer, QueueMailer};
use common::{AppError, AppResult};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    config.service.host = args.host;
    config.service.port = args.port;

    let db = Arc::new(Database::connect(&config).await?);

    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    let mailer = mailer_for(&config).await?;

    let app_state = AppState::from_config(db, Arc::new(cache), config.clone(), mailer);
    let app = create_router(app_state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Peer address feeds the rate limiter when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn mailer_for(config: &Config) -> AppResult<Arc<dyn Mailer>> {
    match config.email_delivery {
        EmailDelivery::Direct => build_mailer(&config.smtp),
        EmailDelivery::Queue => {
            let pool = PgPoolOptions::new()
                .max_connections(JOB_WORKER_MAX_CONNECTIONS)
                .connect(&config.database.url)
                .await
                .map_err(|e| AppError::internal(format!("Failed to connect job queue: {}", e)))?;

            PostgresStorage::setup(&pool)
                .await
                .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

            tracing::info!("Emails will be queued for the worker");
            let storage: PostgresStorage<Email> = PostgresStorage::new(pool);
            Ok(Arc::new(QueueMailer::new(storage)))
        }
    }
}
