use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::{
    dto::{EducationRequest, ExperienceRequest, ProfileRequest, ProfileView},
    services,
};
use crate::{
    auth::extractors::AuthUser, error::AppError, state::AppState,
    validation::{parse_id, AppJson},
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(list_profiles).post(upsert_profile).delete(delete_account),
        )
        .route("/profile/me", get(own_profile))
        .route("/profile/user/:user_id", get(profile_by_user))
        .route("/profile/experience", put(add_experience))
        .route(
            "/profile/experience/:exp_id",
            put(update_experience).delete(remove_experience),
        )
        .route("/profile/education", put(add_education))
        .route(
            "/profile/education/:edu_id",
            put(update_education).delete(remove_education),
        )
}

#[instrument(skip(state))]
pub async fn own_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<ProfileView>, AppError> {
    Ok(Json(services::own_profile(state.store.as_ref(), caller).await?))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<ProfileRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let fields = payload.validate()?;
    Ok(Json(
        services::upsert_profile(state.store.as_ref(), caller, fields).await?,
    ))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileView>>, AppError> {
    Ok(Json(services::list_profiles(state.store.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let identity_id = parse_id(&user_id, "There is no profile for this user")?;
    Ok(Json(
        services::profile_by_identity(state.store.as_ref(), identity_id).await?,
    ))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Value>, AppError> {
    services::delete_account(state.store.as_ref(), caller).await?;
    Ok(Json(json!({ "msg": "User deleted" })))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<ExperienceRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let fields = payload.validate()?;
    Ok(Json(
        services::add_experience(state.store.as_ref(), caller, caller, fields).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_experience(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(exp_id): Path<String>,
    AppJson(payload): AppJson<ExperienceRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let entry_id = parse_id(&exp_id, "Experience not found")?;
    let fields = payload.validate()?;
    Ok(Json(
        services::update_experience(state.store.as_ref(), caller, caller, entry_id, fields)
            .await?,
    ))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let entry_id = parse_id(&exp_id, "Experience not found")?;
    Ok(Json(
        services::remove_experience(state.store.as_ref(), caller, caller, entry_id).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<EducationRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let fields = payload.validate()?;
    Ok(Json(
        services::add_education(state.store.as_ref(), caller, caller, fields).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_education(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(edu_id): Path<String>,
    AppJson(payload): AppJson<EducationRequest>,
) -> Result<Json<ProfileView>, AppError> {
    let entry_id = parse_id(&edu_id, "Education not found")?;
    let fields = payload.validate()?;
    Ok(Json(
        services::update_education(state.store.as_ref(), caller, caller, entry_id, fields)
            .await?,
    ))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let entry_id = parse_id(&edu_id, "Education not found")?;
    Ok(Json(
        services::remove_education(state.store.as_ref(), caller, caller, entry_id).await?,
    ))
}
