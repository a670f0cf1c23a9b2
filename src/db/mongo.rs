use std::future::IntoFuture;
use std::time::Duration;

use mongodb::{bson::doc, options::ClientOptions, Client, Database};

use crate::error::{AppError, AppResult};

/// Connects to MongoDB and verifies the server is reachable
///
/// Fails at startup rather than on the first request if the store is down.
pub async fn connect(url: &str, database: &str, timeout: Duration) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(url).await?;
    options.app_name = Some("songbook-api".to_string());
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);

    let client = Client::with_options(options)?;
    let db = client.database(database);

    bounded(timeout, db.run_command(doc! { "ping": 1 })).await?;

    tracing::info!(database = %database, "Connected to MongoDB");

    Ok(db)
}

/// Runs a store operation, failing once `timeout` elapses
pub async fn bounded<T, F>(timeout: Duration, operation: F) -> AppResult<T>
where
    F: IntoFuture<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(timeout, operation.into_future()).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::error!(timeout = ?timeout, "Database operation timed out");
            Err(AppError::UpstreamUnavailable(
                "Database operation timed out".to_string(),
            ))
        }
    }
}
