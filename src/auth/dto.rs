use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Identity;
use crate::{
    error::AppError,
    validation::{is_valid_email, present, Checks},
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Request body for registration.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Checked registration input; email already normalized.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        let mut checks = Checks::new();
        let name = checks.required(&self.name, "name", "Name is required");
        let email = normalize_email(&self.email);
        checks.check(
            is_valid_email(&email),
            "email",
            "Please include a valid email",
        );
        let password = self.password.unwrap_or_default();
        checks.check(
            password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Please enter a password with 6 or more characters",
        );
        checks.finish()?;
        Ok(Registration {
            name,
            email,
            password,
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, AppError> {
        let mut checks = Checks::new();
        let email = normalize_email(&self.email);
        checks.check(
            is_valid_email(&email),
            "email",
            "Please include a valid email",
        );
        let password = self.password.unwrap_or_default();
        checks.check(!password.is_empty(), "password", "Password is required");
        checks.finish()?;
        Ok(Credentials { email, password })
    }
}

fn normalize_email(raw: &Option<String>) -> String {
    present(raw).map(|e| e.to_lowercase()).unwrap_or_default()
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicIdentity,
}

/// Public part of an identity, as embedded in other documents.
#[derive(Debug, Clone, Serialize)]
pub struct PublicIdentity {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

impl From<&Identity> for PublicIdentity {
    fn from(i: &Identity) -> Self {
        Self {
            id: i.id,
            name: i.name.clone(),
            avatar: i.avatar.clone(),
        }
    }
}
