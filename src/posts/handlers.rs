use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::{
    dto::{LikeCount, TextRequest},
    model::{Comment, Like, Post},
    services,
};
use crate::{
    auth::extractors::AuthUser, error::AppError, state::AppState,
    validation::{parse_id, AppJson},
};

const POST_NOT_FOUND: &str = "Post not found";

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).delete(delete_post))
        .route("/posts/:id/like", put(toggle_like))
        .route("/posts/:id/likes", get(like_count))
        .route("/posts/comment/:id", post(add_comment))
        .route("/posts/comment/:id/:comment_id", delete(remove_comment))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<TextRequest>,
) -> Result<Json<Post>, AppError> {
    let text = payload.validate()?;
    Ok(Json(
        services::create_post(state.store.as_ref(), caller, text).await?,
    ))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(services::list_posts(state.store.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id, POST_NOT_FOUND)?;
    Ok(Json(services::get_post(state.store.as_ref(), id).await?))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, POST_NOT_FOUND)?;
    services::delete_post(state.store.as_ref(), id, caller).await?;
    Ok(Json(json!({ "msg": "Post removed" })))
}

#[instrument(skip(state))]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, AppError> {
    let id = parse_id(&id, POST_NOT_FOUND)?;
    Ok(Json(
        services::toggle_like(state.store.as_ref(), id, caller).await?,
    ))
}

#[instrument(skip(state))]
pub async fn like_count(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LikeCount>, AppError> {
    let id = parse_id(&id, POST_NOT_FOUND)?;
    let likes = services::like_count(state.store.as_ref(), id).await?;
    Ok(Json(LikeCount { likes }))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TextRequest>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let id = parse_id(&id, POST_NOT_FOUND)?;
    let text = payload.validate()?;
    Ok(Json(
        services::add_comment(state.store.as_ref(), id, caller, text).await?,
    ))
}

#[instrument(skip(state))]
pub async fn remove_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let id = parse_id(&id, POST_NOT_FOUND)?;
    let comment_id = parse_id(&comment_id, "Comment does not exist")?;
    Ok(Json(
        services::remove_comment(state.store.as_ref(), id, comment_id, caller).await?,
    ))
}
