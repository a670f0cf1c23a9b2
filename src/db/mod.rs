pub mod mongo;
pub mod redis;
pub mod songs;
pub mod users;

pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use redis::CacheWriterHandle;
pub use songs::{parse_song_id, MongoSongStore, SongStore};
pub use users::{MongoUserStore, UserStore};
