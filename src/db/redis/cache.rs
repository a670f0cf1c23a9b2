use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Catalog search by book subject and page size
    BookSearch { genre: String, max_results: u32 },
    /// Track metadata lookup by artist and title
    TrackInfo { artist: String, track: String },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::BookSearch { genre, max_results } => {
                write!(f, "books:{}:{}", genre.to_lowercase(), max_results)
            }
            CacheKey::TrackInfo { artist, track } => write!(
                f,
                "track:{}:{}",
                artist.trim().to_lowercase(),
                track.trim().to_lowercase()
            ),
        }
    }
}

/// Creates a Redis client for caching
///
/// Opening a client does not connect; connections are made per operation.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
    timeout: Duration,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and waits for it to stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");

        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Creates a new Cache instance with a background writer task
    ///
    /// Writes go through a channel so cache stores never block a response.
    /// Every Redis round trip, connect included, is bounded by `timeout`.
    pub fn new(redis_client: Client, timeout: Duration) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(client, timeout, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
            timeout,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Processes write messages until shutdown, then drains what is left
    async fn cache_writer_task(
        client: Client,
        timeout: Duration,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, timeout, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    tracing::info!("Cache writer shutting down, flushing remaining writes");

                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, timeout, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(
        client: &Client,
        timeout: Duration,
        msg: CacheWriteMessage,
    ) -> AppResult<()> {
        let write = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
            Ok::<(), AppError>(())
        };

        tokio::time::timeout(timeout, write)
            .await
            .map_err(|_| AppError::UpstreamUnavailable("Redis write timed out".to_string()))?
    }

    async fn read_from_redis(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;
        Ok(cached)
    }

    /// Retrieves a value from the cache by key
    ///
    /// An unreachable, slow or silent Redis and an undecodable entry are all
    /// treated as a miss so the caller falls through to the upstream source.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached = match tokio::time::timeout(self.timeout, self.read_from_redis(key)).await {
            Ok(Ok(cached)) => cached,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                return Ok(None);
            }
            Err(_) => {
                tracing::warn!(key = %key, timeout = ?self.timeout, "Cache read timed out, treating as miss");
                return Ok(None);
            }
        };

        match cached {
            Some(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    tracing::debug!(key = %key, "Cache hit");
                    Ok(Some(data))
                }
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache deserialization error");
                    Ok(None)
                }
            },
            None => {
                tracing::debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Stores a value in the cache without waiting for the write
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
