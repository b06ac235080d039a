use serde::{Deserialize, Serialize};

/// An image-editing call: a base image plus a prompt describing the desired
/// variant. `sample_count` and `guidance_scale` map onto each model family's
/// own parameter names.
#[derive(Debug, Clone)]
pub struct ImageEditRequest {
    pub prompt: String,
    pub base_image: Vec<u8>,
    pub model_id: Option<String>,
    pub sample_count: Option<u32>,
    pub guidance_scale: Option<f32>,
}

#[derive(Debug)]
pub struct ImageEditResponse {
    pub image_bytes: Vec<u8>,
    pub model: String,
}

#[derive(Serialize, Deserialize)]
pub struct StabilityImageResponse {
    pub artifacts: Vec<StabilityArtifact>,
}

#[derive(Serialize, Deserialize)]
pub struct StabilityArtifact {
    pub base64: String,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanImageResponse {
    pub images: Vec<String>,
}
