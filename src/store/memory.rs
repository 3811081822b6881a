use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::{
    auth::repo_types::Identity,
    posts::model::{Comment, Like, Post},
    profiles::model::Profile,
};

#[derive(Default)]
struct Documents {
    identities: HashMap<Uuid, Identity>,
    profiles: HashMap<Uuid, Profile>, // keyed by profile id
    posts: HashMap<Uuid, Post>,
}

/// Process-local store. Each call takes the lock once, so every write is atomic.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        Ok(self.docs.read().await.identities.get(&id).cloned())
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.identities.values().find(|i| i.email == email).cloned())
    }

    async fn find_identities(&self, ids: &[Uuid]) -> Result<Vec<Identity>, StoreError> {
        let docs = self.docs.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| docs.identities.get(id).cloned())
            .collect())
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let taken = docs.identities.contains_key(&identity.id)
            || docs.identities.values().any(|i| i.email == identity.email);
        if taken {
            return Err(StoreError::Duplicate("User"));
        }
        docs.identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.identities.remove(&id).is_some())
    }

    async fn find_profile_by_owner(&self, owner: Uuid) -> Result<Option<Profile>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.profiles.values().find(|p| p.owner == owner).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let docs = self.docs.read().await;
        let mut all: Vec<Profile> = docs.profiles.values().cloned().collect();
        all.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let taken = docs.profiles.contains_key(&profile.id)
            || docs.profiles.values().any(|p| p.owner == profile.owner);
        if taken {
            return Err(StoreError::Duplicate("Profile"));
        }
        docs.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let stored = docs
            .profiles
            .get_mut(&profile.id)
            .ok_or(StoreError::Missing("Profile"))?;
        // owner and creation date are fixed at insert
        let (owner, date) = (stored.owner, stored.date);
        *stored = Profile {
            owner,
            date,
            ..profile.clone()
        };
        Ok(())
    }

    async fn delete_profile_by_owner(&self, owner: Uuid) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.profiles.len();
        docs.profiles.retain(|_, p| p.owner != owner);
        Ok(docs.profiles.len() != before)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.docs.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let docs = self.docs.read().await;
        let mut all: Vec<Post> = docs.posts.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if docs.posts.contains_key(&post.id) {
            return Err(StoreError::Duplicate("Post"));
        }
        docs.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn toggle_post_like(&self, id: Uuid, user: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.posts.get_mut(&id).ok_or(StoreError::Missing("Post"))?;
        post.toggle_like(user);
        Ok(post.likes.clone())
    }

    async fn prepend_post_comment(
        &self,
        id: Uuid,
        comment: &Comment,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.posts.get_mut(&id).ok_or(StoreError::Missing("Post"))?;
        post.add_comment(comment.clone());
        Ok(post.comments.clone())
    }

    async fn remove_post_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.posts.get_mut(&id).ok_or(StoreError::Missing("Post"))?;
        post.remove_comment(comment_id);
        Ok(post.comments.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.posts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        posts::model::AuthorSnapshot,
        profiles::model::{tests::fields, Profile},
    };
    use time::OffsetDateTime;

    fn identity(email: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: email.into(),
            password_hash: "hash".into(),
            avatar: "avatar".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn email_is_unique() {
        let store = MemoryStore::new();
        store.insert_identity(&identity("ann@x.com")).await.unwrap();
        let err = store
            .insert_identity(&identity("ann@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("User")));
    }

    #[tokio::test]
    async fn one_profile_per_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store
            .insert_profile(&Profile::new(owner, fields("Dev")))
            .await
            .unwrap();
        let err = store
            .insert_profile(&Profile::new(owner, fields("Dev")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("Profile")));
    }

    #[tokio::test]
    async fn save_cannot_move_profile_to_another_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut profile = Profile::new(owner, fields("Dev"));
        store.insert_profile(&profile).await.unwrap();

        profile.owner = Uuid::new_v4();
        profile.status = "Lead".into();
        store.save_profile(&profile).await.unwrap();

        let stored = store.find_profile_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(stored.status, "Lead");
        assert_eq!(stored.owner, owner);
    }

    #[tokio::test]
    async fn posts_list_newest_first() {
        let store = MemoryStore::new();
        let author = AuthorSnapshot {
            name: "Ann".into(),
            avatar: "a".into(),
        };
        let mut older = Post::new(Uuid::new_v4(), "older".into(), author.clone());
        older.date -= time::Duration::minutes(5);
        let newer = Post::new(Uuid::new_v4(), "newer".into(), author);
        store.insert_post(&older).await.unwrap();
        store.insert_post(&newer).await.unwrap();

        let texts: Vec<_> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn editing_a_deleted_post_reports_missing() {
        let store = MemoryStore::new();
        let err = store
            .toggle_post_like(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing("Post")));
    }

    #[tokio::test]
    async fn concurrent_toggles_from_different_users_all_land() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let post = Post::new(
            Uuid::new_v4(),
            "hello".into(),
            AuthorSnapshot {
                name: "Ann".into(),
                avatar: "a".into(),
            },
        );
        store.insert_post(&post).await.unwrap();

        let post_id = post.id;
        let users: Vec<Uuid> = (0..16).map(|_| Uuid::new_v4()).collect();
        let tasks: Vec<_> = users
            .iter()
            .map(|&user| {
                let store = store.clone();
                tokio::spawn(async move { store.toggle_post_like(post_id, user).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let likes = store.find_post(post_id).await.unwrap().unwrap().likes;
        assert_eq!(likes.len(), users.len());
        assert!(users.iter().all(|u| likes.iter().any(|l| l.user == *u)));
    }

    #[tokio::test]
    async fn removing_a_vanished_comment_is_a_no_op() {
        let store = MemoryStore::new();
        let post = Post::new(
            Uuid::new_v4(),
            "hello".into(),
            AuthorSnapshot {
                name: "Ann".into(),
                avatar: "a".into(),
            },
        );
        store.insert_post(&post).await.unwrap();
        let comment = Comment::new(post.owner, "hi".into(), post.author.clone());
        store.prepend_post_comment(post.id, &comment).await.unwrap();

        let after = store.remove_post_comment(post.id, comment.id).await.unwrap();
        assert!(after.is_empty());
        let again = store.remove_post_comment(post.id, comment.id).await.unwrap();
        assert!(again.is_empty());
    }
}
