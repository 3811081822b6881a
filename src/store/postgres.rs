use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::{
    auth::repo_types::Identity,
    posts::{
        model::{Comment, Like, Post},
        repo as posts_repo,
    },
    profiles::{model::Profile, repo as profiles_repo},
};

/// Postgres-backed store; sub-collections live in JSONB columns.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        } else {
            info!("migrations applied");
        }
        Ok(Self { db })
    }
}

fn updated(rows: u64, what: &'static str) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::Missing(what))
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        Ok(Identity::find_by_id(&self.db, id).await?)
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(Identity::find_by_email(&self.db, email).await?)
    }

    async fn find_identities(&self, ids: &[Uuid]) -> Result<Vec<Identity>, StoreError> {
        Ok(Identity::find_many(&self.db, ids).await?)
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        Identity::insert(&self.db, identity)
            .await
            .map_err(|e| StoreError::on_insert(e, "User"))
    }

    async fn delete_identity(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Identity::delete(&self.db, id).await? > 0)
    }

    async fn find_profile_by_owner(&self, owner: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(profiles_repo::find_by_owner(&self.db, owner).await?)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(profiles_repo::list(&self.db).await?)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        profiles_repo::insert(&self.db, profile)
            .await
            .map_err(|e| StoreError::on_insert(e, "Profile"))
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        updated(profiles_repo::save(&self.db, profile).await?, "Profile")
    }

    async fn delete_profile_by_owner(&self, owner: Uuid) -> Result<bool, StoreError> {
        Ok(profiles_repo::delete_by_owner(&self.db, owner).await? > 0)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(posts_repo::find(&self.db, id).await?)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(posts_repo::list_newest_first(&self.db).await?)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        posts_repo::insert(&self.db, post)
            .await
            .map_err(|e| StoreError::on_insert(e, "Post"))
    }

    async fn toggle_post_like(&self, id: Uuid, user: Uuid) -> Result<Vec<Like>, StoreError> {
        posts_repo::toggle_like(&self.db, id, user)
            .await?
            .ok_or(StoreError::Missing("Post"))
    }

    async fn prepend_post_comment(
        &self,
        id: Uuid,
        comment: &Comment,
    ) -> Result<Vec<Comment>, StoreError> {
        posts_repo::prepend_comment(&self.db, id, comment)
            .await?
            .ok_or(StoreError::Missing("Post"))
    }

    async fn remove_post_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        posts_repo::remove_comment(&self.db, id, comment_id)
            .await?
            .ok_or(StoreError::Missing("Post"))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(posts_repo::delete(&self.db, id).await? > 0)
    }
}
