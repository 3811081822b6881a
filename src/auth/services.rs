use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{Credentials, Registration},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::Identity,
};
use crate::{
    error::AppError,
    store::{Store, StoreError},
};

const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Gravatar URL for `email` (200px, pg rated, mystery-man fallback).
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("https://www.gravatar.com/avatar/{hex}?s=200&r=pg&d=mm")
}

/// Creates the identity and mints its first token.
pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    input: Registration,
) -> Result<(Identity, String), AppError> {
    if store.find_identity_by_email(&input.email).await?.is_some() {
        warn!(email = %input.email, "email already registered");
        return Err(AppError::conflict("User already exists"));
    }

    let identity = Identity {
        id: Uuid::new_v4(),
        avatar: gravatar_url(&input.email),
        password_hash: hash_password(input.password).await?,
        name: input.name,
        email: input.email,
        created_at: OffsetDateTime::now_utc(),
    };

    // a concurrent registration may still win the unique index
    store.insert_identity(&identity).await.map_err(|e| match e {
        StoreError::Duplicate(_) => AppError::conflict("User already exists"),
        other => other.into(),
    })?;

    let token = keys.sign(identity.id).map_err(anyhow::Error::from)?;
    info!(identity_id = %identity.id, "user registered");
    Ok((identity, token))
}

/// Unknown email and wrong password produce the same rejection.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    input: Credentials,
) -> Result<(Identity, String), AppError> {
    let Some(identity) = store.find_identity_by_email(&input.email).await? else {
        warn!(email = %input.email, "login unknown email");
        return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
    };

    if !verify_password(input.password, identity.password_hash.clone()).await? {
        warn!(identity_id = %identity.id, "login invalid password");
        return Err(AppError::unauthenticated(INVALID_CREDENTIALS));
    }

    let token = keys.sign(identity.id).map_err(anyhow::Error::from)?;
    info!(identity_id = %identity.id, "user logged in");
    Ok((identity, token))
}

/// Dereferences a token's identity; a deleted account reads as unauthenticated.
pub async fn current_identity(store: &dyn Store, id: Uuid) -> Result<Identity, AppError> {
    store
        .find_identity(id)
        .await?
        .ok_or_else(|| AppError::unauthenticated("User not found"))
}
