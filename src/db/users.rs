use std::time::Duration;

use async_trait::async_trait;
use mongodb::{bson::doc, Collection, Database};
use tracing::instrument;

use crate::{db::mongo::bounded, error::AppResult, models::UserDocument};

/// Data access for registered users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserDocument>>;

    async fn insert(&self, user: UserDocument) -> AppResult<UserDocument>;
}

/// MongoDB-backed user store
pub struct MongoUserStore {
    collection: Collection<UserDocument>,
    timeout: Duration,
}

impl MongoUserStore {
    pub fn new(db: &Database, collection_name: &str, timeout: Duration) -> Self {
        Self {
            collection: db.collection::<UserDocument>(collection_name),
            timeout,
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserDocument>> {
        let user = bounded(self.timeout, self.collection.find_one(doc! { "email": email })).await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, mut user: UserDocument) -> AppResult<UserDocument> {
        let result = bounded(self.timeout, self.collection.insert_one(&user)).await?;
        user.id = result.inserted_id.as_object_id();

        tracing::info!("User registered");
        Ok(user)
    }
}
