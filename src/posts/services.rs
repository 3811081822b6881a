use tracing::info;
use uuid::Uuid;

use super::model::{AuthorSnapshot, Comment, Like, Post};
use crate::{
    auth::{ownership::ensure_owner, services::current_identity},
    error::AppError,
    store::Store,
};

const POST_NOT_FOUND: &str = "Post not found";

async fn load(store: &dyn Store, id: Uuid) -> Result<Post, AppError> {
    store
        .find_post(id)
        .await?
        .ok_or_else(|| AppError::not_found(POST_NOT_FOUND))
}

/// New post stamped with the caller's current name and avatar.
pub async fn create_post(store: &dyn Store, caller: Uuid, text: String) -> Result<Post, AppError> {
    let author = current_identity(store, caller).await?;
    let post = Post::new(caller, text, AuthorSnapshot::of(&author));
    store.insert_post(&post).await?;
    info!(post_id = %post.id, "post created");
    Ok(post)
}

pub async fn list_posts(store: &dyn Store) -> Result<Vec<Post>, AppError> {
    Ok(store.list_posts().await?)
}

pub async fn get_post(store: &dyn Store, id: Uuid) -> Result<Post, AppError> {
    load(store, id).await
}

pub async fn delete_post(store: &dyn Store, id: Uuid, caller: Uuid) -> Result<(), AppError> {
    let post = load(store, id).await?;
    ensure_owner(&post, caller)?;
    if !store.delete_post(id).await? {
        return Err(AppError::not_found(POST_NOT_FOUND));
    }
    info!(post_id = %id, "post removed");
    Ok(())
}

/// Likes or unlikes for `caller`; returns the resulting like list.
pub async fn toggle_like(store: &dyn Store, id: Uuid, caller: Uuid) -> Result<Vec<Like>, AppError> {
    let likes = store.toggle_post_like(id, caller).await?;
    let liked = likes.iter().any(|like| like.user == caller);
    info!(post_id = %id, liked, "like toggled");
    Ok(likes)
}

pub async fn like_count(store: &dyn Store, id: Uuid) -> Result<usize, AppError> {
    Ok(load(store, id).await?.like_count())
}

/// Prepends a comment by `caller`; returns the resulting comment list.
pub async fn add_comment(
    store: &dyn Store,
    id: Uuid,
    caller: Uuid,
    text: String,
) -> Result<Vec<Comment>, AppError> {
    let author = current_identity(store, caller).await?;
    let comment = Comment::new(caller, text, AuthorSnapshot::of(&author));
    let comments = store.prepend_post_comment(id, &comment).await?;
    info!(post_id = %id, comment_id = %comment.id, "comment added");
    Ok(comments)
}

/// Checks the caller against the stored comment, then removes it by id in
/// the store. A comment's owner never changes, so the check stays valid.
pub async fn remove_comment(
    store: &dyn Store,
    id: Uuid,
    comment_id: Uuid,
    caller: Uuid,
) -> Result<Vec<Comment>, AppError> {
    load(store, id).await?.removable_comment(comment_id, caller)?;
    let comments = store.remove_post_comment(id, comment_id).await?;
    info!(post_id = %id, %comment_id, "comment removed");
    Ok(comments)
}
