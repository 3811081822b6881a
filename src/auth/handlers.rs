use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AuthResponse, LoginRequest, PublicIdentity, RegisterRequest},
    extractors::AuthUser,
    repo_types::Identity,
    services,
};
use crate::{error::AppError, state::AppState, validation::AppJson};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/auth", post(login).get(current))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let input = payload.validate()?;
    let (identity, token) = services::register(state.store.as_ref(), &state.jwt, input).await?;
    Ok(Json(AuthResponse {
        token,
        user: PublicIdentity::from(&identity),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let input = payload.validate()?;
    let (identity, token) = services::login(state.store.as_ref(), &state.jwt, input).await?;
    Ok(Json(AuthResponse {
        token,
        user: PublicIdentity::from(&identity),
    }))
}

/// Authenticated identity without its password hash.
#[instrument(skip(state))]
pub async fn current(
    State(state): State<AppState>,
    AuthUser(identity_id): AuthUser,
) -> Result<Json<Identity>, AppError> {
    let identity = services::current_identity(state.store.as_ref(), identity_id).await?;
    Ok(Json(identity))
}
