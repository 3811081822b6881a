use serde::{Deserialize, Serialize};

use crate::{error::AppError, validation::Checks};

/// Body of both post creation and comment creation.
#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

impl TextRequest {
    pub fn validate(self) -> Result<String, AppError> {
        let mut checks = Checks::new();
        let text = checks.required(&self.text, "text", "Text is required");
        checks.finish()?;
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
pub struct LikeCount {
    pub likes: usize,
}
