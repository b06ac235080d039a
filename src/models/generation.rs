use serde::{Deserialize, Serialize};

/// A validated generation request: one product photo plus the two text
/// fields from the upload form.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub photo: Vec<u8>,
    pub keywords: String,
    pub tone: String,
}

#[derive(Debug)]
pub enum ValidationError {
    /// The photo field was absent or empty.
    NoPhoto,
    /// `keywords` or `tone` was absent or blank after trimming.
    MissingFormData,
}

impl GenerationRequest {
    pub fn new(photo: Vec<u8>, keywords: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            photo,
            keywords: keywords.into(),
            tone: tone.into(),
        }
    }

    /// Checks the request before any model call is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.photo.is_empty() {
            return Err(ValidationError::NoPhoto);
        }
        if self.keywords.trim().is_empty() || self.tone.trim().is_empty() {
            return Err(ValidationError::MissingFormData);
        }
        Ok(())
    }
}

/// The combined result returned to the client. `magic_photo` carries the
/// generated image as base64 so the page can embed it in a data URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub story: String,
    pub social: String,
    pub magic_photo: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
