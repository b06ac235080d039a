use crate::{
    capabilities::TextGeneration,
    error::{ModelError, Result},
    models::{AnthropicMessagesResponse, TextGenerationRequest, TextGenerationResponse, TitanTextResponse},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::json;

#[derive(Clone)]
pub struct TextClient {
    client: Client,
}

impl TextClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn build_request_payload(
        request: &TextGenerationRequest,
        model_id: &str,
    ) -> Result<serde_json::Value> {
        let payload = match model_id {
            id if id.starts_with("amazon.titan") => json!({
                "inputText": request.prompt,
                "textGenerationConfig": {
                    "maxTokenCount": request.max_tokens.unwrap_or(512),
                    "temperature": request.temperature.unwrap_or(0.7),
                    "topP": 0.9
                }
            }),
            id if id.starts_with("anthropic.claude") => json!({
                "messages": [
                    {
                        "role": "user",
                        "content": request.prompt
                    }
                ],
                "max_tokens": request.max_tokens.unwrap_or(512),
                "temperature": request.temperature.unwrap_or(0.7),
                "anthropic_version": "bedrock-2023-05-31"
            }),
            _ => {
                return Err(ModelError::Request(format!(
                    "Unsupported text model ID: {}",
                    model_id
                )))
            }
        };

        Ok(payload)
    }

    fn extract_text(response_str: &str, model_id: &str) -> Result<String> {
        match model_id {
            id if id.starts_with("amazon.titan") => {
                let titan: TitanTextResponse = serde_json::from_str(response_str)
                    .map_err(|e| ModelError::Response(e.to_string()))?;
                titan
                    .results
                    .into_iter()
                    .next()
                    .map(|result| result.output_text)
                    .ok_or_else(|| ModelError::Response("No text generated".into()))
            }
            id if id.starts_with("anthropic.claude") => {
                let messages: AnthropicMessagesResponse = serde_json::from_str(response_str)
                    .map_err(|e| ModelError::Response(e.to_string()))?;
                messages
                    .content
                    .into_iter()
                    .find_map(|block| block.text)
                    .ok_or_else(|| ModelError::Response("No text generated".into()))
            }
            _ => Err(ModelError::Response(
                "Unexpected model type in text response".into(),
            )),
        }
    }
}

#[async_trait]
impl TextGeneration for TextClient {
    async fn generate(&self, request: TextGenerationRequest) -> Result<TextGenerationResponse> {
        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or("anthropic.claude-3-haiku-20240307-v1:0");

        let request_payload = Self::build_request_payload(&request, model_id)?;
        let request_json = serde_json::to_string(&request_payload)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;

        log::info!("Invoking text model: {}", model_id);
        log::debug!("Text generation request payload: {}", request_json);

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
                log::error!("AWS SDK text generation error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    log::error!("Service error code: {:?}", service_error.code());
                    log::error!("Service error message: {:?}", service_error.message());
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

        let text = Self::extract_text(&response_str, model_id)?;

        Ok(TextGenerationResponse {
            text,
            model: model_id.to_string(),
        })
    }
}
