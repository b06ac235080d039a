use crate::{
    capabilities::ImageEditing,
    error::{ModelError, Result},
    models::{ImageEditRequest, ImageEditResponse, StabilityImageResponse, TitanImageResponse},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
}

impl ImageClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn build_request_payload(request: &ImageEditRequest, model_id: &str) -> Result<serde_json::Value> {
        let base_image = BASE64.encode(&request.base_image);

        let payload = match model_id {
            id if id.starts_with("stability.") => json!({
                "text_prompts": [
                    {
                        "text": request.prompt
                    }
                ],
                "init_image": base_image,
                "init_image_mode": "IMAGE_STRENGTH",
                "cfg_scale": request.guidance_scale.unwrap_or(7.0),
                "samples": request.sample_count.unwrap_or(1)
            }),
            id if id.starts_with("amazon.titan-image") => json!({
                "taskType": "IMAGE_VARIATION",
                "imageVariationParams": {
                    "text": request.prompt,
                    "images": [base_image]
                },
                "imageGenerationConfig": {
                    "numberOfImages": request.sample_count.unwrap_or(1),
                    "cfgScale": request.guidance_scale.unwrap_or(8.0)
                }
            }),
            _ => return Err(ModelError::Request(format!(
                "Unsupported image model ID: {}",
                model_id
            ))),
        };

        Ok(payload)
    }

    fn extract_image(response_str: &str, model_id: &str) -> Result<Vec<u8>> {
        let encoded = match model_id {
            id if id.starts_with("stability.") => {
                let stability: StabilityImageResponse = serde_json::from_str(response_str)
                    .map_err(|e| ModelError::Response(e.to_string()))?;
                stability
                    .artifacts
                    .into_iter()
                    .next()
                    .map(|artifact| artifact.base64)
            }
            id if id.starts_with("amazon.titan-image") => {
                let titan: TitanImageResponse = serde_json::from_str(response_str)
                    .map_err(|e| ModelError::Response(e.to_string()))?;
                titan.images.into_iter().next()
            }
            _ => {
                return Err(ModelError::Response(
                    "Unexpected model type in image response".into(),
                ))
            }
        };

        let encoded = encoded.ok_or_else(|| ModelError::Response("No images generated".into()))?;

        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| ModelError::Response(e.to_string()))
    }
}

#[async_trait]
impl ImageEditing for ImageClient {
    async fn edit(&self, request: ImageEditRequest) -> Result<ImageEditResponse> {
        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or("stability.stable-diffusion-xl-v1");

        let request_payload = Self::build_request_payload(&request, model_id)?;
        let request_json = serde_json::to_string(&request_payload)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;

        log::info!("Editing image with model: {}", model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("AWS SDK image edit error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    ModelError::AwsService(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    ModelError::Aws(format!("AWS SDK error: {}", e))
                }
            })?;

        let response_bytes = response.body.into_inner();
        let response_str = String::from_utf8(response_bytes)
            .map_err(|e| ModelError::Response(e.to_string()))?;

        let image_bytes = Self::extract_image(&response_str, model_id)?;

        Ok(ImageEditResponse {
            image_bytes,
            model: model_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_request(model_id: &str) -> ImageEditRequest {
        ImageEditRequest {
            prompt: "a warm lifestyle setting".into(),
            base_image: vec![0xFF, 0xD8, 0xFF],
            model_id: Some(model_id.into()),
            sample_count: Some(1),
            guidance_scale: Some(21.0),
        }
    }

    #[test]
    fn stability_payload_embeds_base_image_and_parameters() {
        let request = edit_request("stability.stable-diffusion-xl-v1");
        let payload =
            ImageClient::build_request_payload(&request, "stability.stable-diffusion-xl-v1")
                .unwrap();
        assert_eq!(payload["init_image"], BASE64.encode([0xFF, 0xD8, 0xFF]));
        assert_eq!(payload["cfg_scale"], 21.0);
        assert_eq!(payload["samples"], 1);
        assert_eq!(payload["text_prompts"][0]["text"], "a warm lifestyle setting");
    }

    #[test]
    fn titan_payload_uses_variation_task() {
        let request = edit_request("amazon.titan-image-generator-v1");
        let payload =
            ImageClient::build_request_payload(&request, "amazon.titan-image-generator-v1")
                .unwrap();
        assert_eq!(payload["taskType"], "IMAGE_VARIATION");
        assert_eq!(payload["imageGenerationConfig"]["numberOfImages"], 1);
    }

    #[test]
    fn unsupported_model_is_rejected() {
        let request = edit_request("sdxl.unknown");
        let result = ImageClient::build_request_payload(&request, "sdxl.unknown");
        assert!(matches!(result, Err(ModelError::Request(_))));
    }

    #[test]
    fn extracts_first_stability_artifact() {
        let bytes = vec![1u8, 2, 3, 4];
        let body = format!(
            r#"{{"artifacts": [{{"base64": "{}", "finishReason": "SUCCESS"}}]}}"#,
            BASE64.encode(&bytes)
        );
        let decoded =
            ImageClient::extract_image(&body, "stability.stable-diffusion-xl-v1").unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn empty_artifact_list_is_a_response_error() {
        let body = r#"{"artifacts": []}"#;
        let result = ImageClient::extract_image(body, "stability.stable-diffusion-xl-v1");
        assert!(matches!(result, Err(ModelError::Response(_))));
    }
}
