use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{AuthorSnapshot, Comment, Like, Post};

#[derive(Debug, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub text: String,
    pub author_name: String,
    pub author_avatar: String,
    pub likes: Json<Vec<Like>>,
    pub comments: Json<Vec<Comment>>,
    pub created_at: OffsetDateTime,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Self {
            id: r.id,
            owner: r.owner_id,
            text: r.text,
            author: AuthorSnapshot {
                name: r.author_name,
                avatar: r.author_avatar,
            },
            likes: r.likes.0,
            comments: r.comments.0,
            date: r.created_at,
        }
    }
}
