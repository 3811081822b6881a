use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::{AppError, FieldError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its calendar date is kept).
pub(crate) fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|dt| dt.date()))
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Path ids that do not parse cannot name an existing document.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found(not_found))
}

/// `Json` body extractor whose rejection is an `AppError`, so unreadable or
/// mistyped bodies answer 400 with the usual `errors` list.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

/// Collects every failed rule of a request body before reporting.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, param: &str, msg: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    /// Requires a non-blank value and hands it back trimmed.
    pub fn required(&mut self, value: &Option<String>, param: &str, msg: &str) -> String {
        match present(value) {
            Some(v) => v,
            None => {
                self.errors.push(FieldError::new(param, msg));
                String::new()
            }
        }
    }

    /// Requires a parseable date when `required`, otherwise only validates what is there.
    pub fn date(&mut self, value: &Option<String>, param: &str, required: bool) -> Option<Date> {
        match present(value) {
            Some(raw) => {
                let parsed = parse_date(&raw);
                if parsed.is_none() {
                    self.errors
                        .push(FieldError::new(param, format!("{param} is not a valid date")));
                }
                parsed
            }
            None => {
                if required {
                    self.errors
                        .push(FieldError::new(param, format!("{param} date is required")));
                }
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
