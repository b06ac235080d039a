use crate::{
    error::Result,
    models::{ImageEditRequest, ImageEditResponse, TextGenerationRequest, TextGenerationResponse},
};
use async_trait::async_trait;

/// A hosted model that turns a prompt into generated text.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, request: TextGenerationRequest) -> Result<TextGenerationResponse>;
}

/// A hosted model that turns a base image plus a prompt into an edited
/// variant of that image.
#[async_trait]
pub trait ImageEditing: Send + Sync {
    async fn edit(&self, request: ImageEditRequest) -> Result<ImageEditResponse>;
}
