//! Jobs command - Email queue management.
//!
//! - `work`: deliver queued emails
//! - `list`: show job counts by status
//! - `clear`: remove failed jobs
//!
//! ```bash
//! EMAIL_DELIVERY=queue billing-service serve
//! billing-service jobs work
//! ```

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, EMAIL_WORKER_NAME, JOB_WORKER_MAX_CONNECTIONS};
use crate::infra::Database;
use common::{AppError, AppResult};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Start the email worker over the PostgreSQL-backed queue.
async fn run_worker(config: &Config) -> AppResult<()> {
    use std::sync::Arc;

    use apalis::prelude::*;
    use apalis_sql::postgres::PostgresStorage;
    use apalis_sql::sqlx::postgres::PgPoolOptions;

    use crate::jobs::deliver_email;
    use crate::notifications::{build_mailer, Email, Mailer};

    let pool = PgPoolOptions::new()
        .max_connections(JOB_WORKER_MAX_CONNECTIONS)
        .connect(&config.database.url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    let storage: PostgresStorage<Email> = PostgresStorage::new(pool);
    let mailer: Arc<dyn Mailer> = build_mailer(&config.smtp)?;

    if !config.smtp.is_configured() {
        tracing::warn!("SMTP_HOST not set, queued emails will only be logged");
    }

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new(EMAIL_WORKER_NAME)
        .data(mailer)
        .backend(storage)
        .build_fn(deliver_email);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

/// Print job counts by status.
async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;
    let conn = db.connection();

    if !queue_exists(conn).await? {
        println!("Job queue not initialized. Run 'jobs work' first to create the queue tables.");
        return Ok(());
    }

    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text AS status, COUNT(*)::bigint AS count FROM apalis.jobs GROUP BY status"
                .to_string(),
        ))
        .await?;

    let counts: Vec<(String, i64)> = rows
        .iter()
        .filter_map(|row| {
            let status = row.try_get::<String>("", "status").ok()?;
            let count = row.try_get::<i64>("", "count").ok()?;
            Some((status, count))
        })
        .collect();

    println!("\n=== Job Queue Status ===");
    for status in ["Pending", "Running", "Failed", "Done"] {
        println!("{:<9} {}", format!("{}:", status), count_for(&counts, status));
    }
    println!("========================\n");

    Ok(())
}

/// Remove failed jobs from the queue.
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;
    let conn = db.connection();

    if !queue_exists(conn).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = conn
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'".to_string(),
        ))
        .await?;

    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());
    Ok(())
}

async fn queue_exists(conn: &DatabaseConnection) -> AppResult<bool> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') AS exists"
                .to_string(),
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

fn count_for(counts: &[(String, i64)], status: &str) -> i64 {
    counts
        .iter()
        .find(|(s, _)| s == status)
        .map(|(_, c)| *c)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_for_missing_status_is_zero() {
        let counts = vec![("Pending".to_string(), 3), ("Failed".to_string(), 1)];

        assert_eq!(count_for(&counts, "Pending"), 3);
        assert_eq!(count_for(&counts, "Failed"), 1);
        assert_eq!(count_for(&counts, "Done"), 0);
    }
}
