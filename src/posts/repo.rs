use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{
    model::{Comment, Like, Post},
    repo_types::PostRow,
};

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT id, owner_id, text, author_name, author_avatar, likes, comments, created_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Post::from))
}

pub async fn list_newest_first(db: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT id, owner_id, text, author_name, author_avatar, likes, comments, created_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Post::from).collect())
}

pub async fn insert(db: &PgPool, post: &Post) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO posts (id, owner_id, text, author_name, author_avatar, likes, comments, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(post.id)
    .bind(post.owner)
    .bind(&post.text)
    .bind(&post.author.name)
    .bind(&post.author.avatar)
    .bind(Json(&post.likes))
    .bind(Json(&post.comments))
    .bind(post.date)
    .execute(db)
    .await?;
    Ok(())
}

/// Flips `user`'s like inside one UPDATE: the row lock makes a concurrent
/// toggle re-read the array this one wrote. `None` when the post is gone.
pub async fn toggle_like(db: &PgPool, id: Uuid, user: Uuid) -> Result<Option<Vec<Like>>, sqlx::Error> {
    let like = Like { user };
    let likes = sqlx::query_scalar::<_, Json<Vec<Like>>>(
        r#"
        UPDATE posts
           SET likes = CASE
                   WHEN likes @> $2 THEN COALESCE(
                       (SELECT jsonb_agg(l ORDER BY ord)
                          FROM jsonb_array_elements(likes) WITH ORDINALITY AS t(l, ord)
                         WHERE NOT (l @> $3)),
                       '[]'::jsonb)
                   ELSE $2 || likes
               END
         WHERE id = $1
        RETURNING likes
        "#,
    )
    .bind(id)
    .bind(Json([like]))
    .bind(Json(like))
    .fetch_optional(db)
    .await?;
    Ok(likes.map(|Json(likes)| likes))
}

pub async fn prepend_comment(
    db: &PgPool,
    id: Uuid,
    comment: &Comment,
) -> Result<Option<Vec<Comment>>, sqlx::Error> {
    let comments = sqlx::query_scalar::<_, Json<Vec<Comment>>>(
        "UPDATE posts SET comments = $2 || comments WHERE id = $1 RETURNING comments",
    )
    .bind(id)
    .bind(Json([comment]))
    .fetch_optional(db)
    .await?;
    Ok(comments.map(|Json(comments)| comments))
}

/// Filters the comment out by id in place, keeping the order of the rest.
pub async fn remove_comment(
    db: &PgPool,
    id: Uuid,
    comment_id: Uuid,
) -> Result<Option<Vec<Comment>>, sqlx::Error> {
    let comments = sqlx::query_scalar::<_, Json<Vec<Comment>>>(
        r#"
        UPDATE posts
           SET comments = COALESCE(
                   (SELECT jsonb_agg(c ORDER BY ord)
                      FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(c, ord)
                     WHERE c->>'id' <> $2),
                   '[]'::jsonb)
         WHERE id = $1
        RETURNING comments
        "#,
    )
    .bind(id)
    .bind(comment_id.to_string())
    .fetch_optional(db)
    .await?;
    Ok(comments.map(|Json(comments)| comments))
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
