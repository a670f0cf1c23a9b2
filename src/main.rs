use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songbook_api::{
    config::Config,
    db::{self, create_redis_client, Cache, MongoSongStore, MongoUserStore},
    routes::{create_router, AppState},
    services::{
        AuthService, FastEmbedder, GenreMapper, GoogleBooksCatalog, LastFmClient,
        RecommendationService, SongService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store_timeout = Duration::from_secs(config.store_timeout_secs);
    let database =
        db::mongo::connect(&config.mongo_url, &config.mongo_database, store_timeout).await?;
    let (cache, cache_writer) =
        Cache::new(create_redis_client(&config.redis_url)?, store_timeout);

    // Model load and vocabulary embedding are blocking; finish before serving
    let cache_dir = config.embedding_cache_dir.clone();
    let default_genre = config.default_book_genre.clone();
    let mapper = tokio::task::spawn_blocking(move || {
        let embedder = FastEmbedder::new(cache_dir);
        embedder.warm_up()?;
        GenreMapper::with_default_vocabulary(Arc::new(embedder), default_genre)
    })
    .await??;

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let catalog = GoogleBooksCatalog::new(
        cache.clone(),
        config.google_books_api_url.clone(),
        config.google_books_api_key.clone(),
        timeout,
    )?;
    let lastfm = Arc::new(LastFmClient::new(
        cache,
        config.lastfm_api_key.clone(),
        config.lastfm_api_url.clone(),
        timeout,
    )?);

    let song_store = Arc::new(MongoSongStore::new(
        database.clone(),
        &config.songs_collection,
        store_timeout,
    ));
    let user_store = Arc::new(MongoUserStore::new(
        &database,
        &config.users_collection,
        store_timeout,
    ));

    let state = Arc::new(AppState {
        recommendations: RecommendationService::new(
            song_store.clone(),
            Arc::new(catalog),
            Arc::new(mapper),
        ),
        songs: SongService::new(song_store, lastfm.clone(), config.max_song_batch),
        auth: AuthService::new(
            user_store,
            config.jwt_secret.clone(),
            config.token_ttl_minutes,
        ),
        track_metadata: lastfm,
    });

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
