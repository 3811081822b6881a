use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::repo_types::Identity,
    posts::model::{Comment, Like, Post},
    profiles::model::Profile,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key (email, profile owner, id) is already taken.
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    /// The document to update vanished between load and save.
    #[error("{0} missing")]
    Missing(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn on_insert(err: sqlx::Error, what: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(what),
            _ => StoreError::Database(err),
        }
    }
}

/// Document store holding identities, profiles and posts.
///
/// Every write is one atomic operation. Likes and comments are edited in
/// place by the store, so concurrent toggles and comments on one post never
/// overwrite each other. Profiles are saved whole: two concurrent
/// read-modify-write cycles on the same profile race and the later save wins.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError>;
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;
    async fn find_identities(&self, ids: &[Uuid]) -> Result<Vec<Identity>, StoreError>;
    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError>;
    async fn delete_identity(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_profile_by_owner(&self, owner: Uuid) -> Result<Option<Profile>, StoreError>;
    /// Oldest first.
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;
    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError>;
    /// Overwrites every mutable field of the stored profile.
    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError>;
    async fn delete_profile_by_owner(&self, owner: Uuid) -> Result<bool, StoreError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn insert_post(&self, post: &Post) -> Result<(), StoreError>;
    /// Likes or unlikes for `user` in one step; returns the resulting likes.
    async fn toggle_post_like(&self, id: Uuid, user: Uuid) -> Result<Vec<Like>, StoreError>;
    /// Prepends `comment`; returns the resulting comments.
    async fn prepend_post_comment(
        &self,
        id: Uuid,
        comment: &Comment,
    ) -> Result<Vec<Comment>, StoreError>;
    /// Drops the comment keyed `comment_id`, if still there; returns the
    /// resulting comments.
    async fn remove_post_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<Comment>, StoreError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;
}
