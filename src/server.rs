use actix_multipart::{Field, Multipart};
use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer, ResponseError};
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{ErrorBody, GenerationRequest, ValidationError};
use crate::orchestrator::Orchestrator;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// The endpoint's user-visible failure surface. Every variant renders as
/// `{"error": <message>}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No photo provided")]
    NoPhoto,
    #[error("Missing form data")]
    MissingFormData,
    #[error("Failed to generate image")]
    ImageGeneration,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoPhoto | ApiError::MissingFormData => StatusCode::BAD_REQUEST,
            ApiError::ImageGeneration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::NoPhoto => ApiError::NoPhoto,
            ValidationError::MissingFormData => ApiError::MissingFormData,
        }
    }
}

pub async fn run(config: Config, orchestrator: Orchestrator) -> std::io::Result<()> {
    let port = config.port();
    let data = web::Data::new(orchestrator);

    log::info!("Listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .route("/api/generate-all", web::post().to(generate_all))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/generate-all. Collects the three form fields, validates them
/// before any model call, then hands off to the orchestrator.
async fn generate_all(
    orchestrator: web::Data<Orchestrator>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();

    let mut photo: Option<Vec<u8>> = None;
    let mut keywords: Option<String> = None;
    let mut tone: Option<String> = None;

    while let Some(mut field) = payload.try_next().await.map_err(|e| {
        log::warn!("[{}] Unreadable multipart payload: {}", request_id, e);
        ApiError::MissingFormData
    })? {
        let name = field.name().to_string();
        match name.as_str() {
            "photo" => photo = Some(read_field_bytes(&mut field).await?),
            "keywords" => keywords = Some(read_field_string(&mut field).await?),
            "tone" => tone = Some(read_field_string(&mut field).await?),
            // Unknown fields are drained and ignored.
            _ => drain_field(&mut field).await,
        }
    }

    let request = GenerationRequest::new(
        photo.ok_or(ApiError::NoPhoto)?,
        keywords.unwrap_or_default(),
        tone.unwrap_or_default(),
    );
    request.validate()?;

    log::info!(
        "[{}] Generating content for keywords: {} with tone: {}",
        request_id,
        request.keywords,
        request.tone
    );

    let response = orchestrator.generate_all(request).await.map_err(|e| {
        log::error!("[{}] Generation failed: {}", request_id, e);
        ApiError::ImageGeneration
    })?;

    log::info!("[{}] Generation complete", request_id);

    Ok(HttpResponse::Ok().json(response))
}

async fn read_field_bytes(field: &mut Field) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|_| ApiError::MissingFormData)?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_field_string(field: &mut Field) -> Result<String, ApiError> {
    let bytes = read_field_bytes(field).await?;
    String::from_utf8(bytes).map_err(|_| ApiError::MissingFormData)
}

async fn drain_field(field: &mut Field) {
    while let Some(chunk) = field.next().await {
        if chunk.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{ImageEditing, TextGeneration};
    use crate::config::GenerationConfig;
    use crate::error::{ModelError, Result as ModelResult};
    use crate::models::{
        ImageEditRequest, ImageEditResponse, TextGenerationRequest, TextGenerationResponse,
    };
    use actix_web::test;
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use std::sync::Arc;

    struct FixedText(&'static str);

    #[async_trait]
    impl TextGeneration for FixedText {
        async fn generate(
            &self,
            request: TextGenerationRequest,
        ) -> ModelResult<TextGenerationResponse> {
            Ok(TextGenerationResponse {
                text: self.0.to_string(),
                model: request.model_id.unwrap_or_default(),
            })
        }
    }

    struct FixedImage(Vec<u8>);

    #[async_trait]
    impl ImageEditing for FixedImage {
        async fn edit(&self, request: ImageEditRequest) -> ModelResult<ImageEditResponse> {
            Ok(ImageEditResponse {
                image_bytes: self.0.clone(),
                model: request.model_id.unwrap_or_default(),
            })
        }
    }

    struct FailingImage;

    #[async_trait]
    impl ImageEditing for FailingImage {
        async fn edit(&self, _: ImageEditRequest) -> ModelResult<ImageEditResponse> {
            Err(ModelError::Aws("connection reset".into()))
        }
    }

    fn app_data(
        text: impl TextGeneration + 'static,
        image: impl ImageEditing + 'static,
    ) -> web::Data<Orchestrator> {
        web::Data::new(Orchestrator::new(
            Arc::new(text),
            Arc::new(image),
            GenerationConfig::new(),
        ))
    }

    const BOUNDARY: &str = "craftgen-test-boundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        (
            format!("multipart/form-data; boundary={}", BOUNDARY),
            body,
        )
    }

    async fn post_generate_all(
        data: web::Data<Orchestrator>,
        parts: &[(&str, Option<&str>, &[u8])],
    ) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(data)
                .route("/health", web::get().to(health))
                .route("/api/generate-all", web::post().to(generate_all)),
        )
        .await;

        let (content_type, body) = multipart_body(parts);
        let request = test::TestRequest::post()
            .uri("/api/generate-all")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();

        let response = test::call_service(&app, request).await;
        let status = response.status();
        let body = test::read_body(response).await;
        let json = serde_json::from_slice(&body).expect("response body was not JSON");
        (status, json)
    }

    #[actix_web::test]
    async fn missing_photo_is_a_client_error() {
        let data = app_data(FixedText("STORY: s SOCIAL: c"), FixedImage(vec![1]));
        let (status, body) = post_generate_all(
            data,
            &[
                ("keywords", None, b"handwoven silk scarf".as_slice()),
                ("tone", None, b"warm".as_slice()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No photo provided");
    }

    #[actix_web::test]
    async fn missing_keywords_is_a_client_error() {
        let data = app_data(FixedText("STORY: s SOCIAL: c"), FixedImage(vec![1]));
        let (status, body) = post_generate_all(
            data,
            &[
                ("photo", Some("scarf.png"), [1u8, 2, 3].as_slice()),
                ("tone", None, b"warm".as_slice()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing form data");
    }

    #[actix_web::test]
    async fn blank_tone_is_a_client_error() {
        let data = app_data(FixedText("STORY: s SOCIAL: c"), FixedImage(vec![1]));
        let (status, body) = post_generate_all(
            data,
            &[
                ("photo", Some("scarf.png"), [1u8, 2, 3].as_slice()),
                ("keywords", None, b"handwoven silk scarf".as_slice()),
                ("tone", None, b"   ".as_slice()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing form data");
    }

    #[actix_web::test]
    async fn successful_generation_returns_the_combined_response() {
        let image_bytes = vec![7u8, 8, 9];
        let data = app_data(
            FixedText("STORY: A scarf... SOCIAL: Lovely! #handmade #silk"),
            FixedImage(image_bytes.clone()),
        );
        let (status, body) = post_generate_all(
            data,
            &[
                ("photo", Some("scarf.png"), [1u8, 2, 3].as_slice()),
                ("keywords", None, b"handwoven silk scarf".as_slice()),
                ("tone", None, b"warm".as_slice()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["story"], "A scarf...");
        assert_eq!(body["social"], "Lovely! #handmade #silk");
        let magic_photo = body["magic_photo"].as_str().unwrap();
        assert_eq!(BASE64.decode(magic_photo).unwrap(), image_bytes);
    }

    #[actix_web::test]
    async fn image_failure_returns_500_without_partial_fields() {
        let data = app_data(FixedText("STORY: s SOCIAL: c"), FailingImage);
        let (status, body) = post_generate_all(
            data,
            &[
                ("photo", Some("scarf.png"), [1u8, 2, 3].as_slice()),
                ("keywords", None, b"handwoven silk scarf".as_slice()),
                ("tone", None, b"warm".as_slice()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate image");
        assert!(body.get("story").is_none());
        assert!(body.get("social").is_none());
        assert!(body.get("magic_photo").is_none());
    }

    #[actix_web::test]
    async fn unknown_fields_are_ignored() {
        let data = app_data(FixedText("STORY: s SOCIAL: c"), FixedImage(vec![1]));
        let (status, _body) = post_generate_all(
            data,
            &[
                ("photo", Some("scarf.png"), [1u8, 2, 3].as_slice()),
                ("keywords", None, b"handwoven silk scarf".as_slice()),
                ("tone", None, b"warm".as_slice()),
                ("extra", None, b"ignored".as_slice()),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn health_endpoint_reports_ok() {
        let data = app_data(FixedText("STORY: s SOCIAL: c"), FixedImage(vec![1]));
        let app = test::init_service(
            App::new()
                .app_data(data)
                .route("/health", web::get().to(health)),
        )
        .await;

        let request = test::TestRequest::get().uri("/health").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
