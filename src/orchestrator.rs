use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::time::timeout;

use crate::capabilities::{ImageEditing, TextGeneration};
use crate::config::GenerationConfig;
use crate::error::{ModelError, Result};
use crate::models::{GenerationRequest, GenerationResponse, ImageEditRequest, TextGenerationRequest};

pub const STORY_FALLBACK: &str = "Error generating story.";
pub const SOCIAL_FALLBACK: &str = "Error generating social media post.";

const STORY_MARKER: &str = "STORY:";
const SOCIAL_MARKER: &str = "SOCIAL:";

const IMAGE_SAMPLE_COUNT: u32 = 1;
const IMAGE_GUIDANCE_SCALE: f32 = 21.0;

/// Runs one generation request end to end: builds both prompts, invokes the
/// text and image capabilities concurrently, applies each side's recovery
/// policy, and assembles the combined response.
///
/// The two sides fail differently on purpose: the caller always gets some
/// text (placeholders if the model let us down), but never a broken image —
/// an unusable image result aborts the whole request.
pub struct Orchestrator {
    text: Arc<dyn TextGeneration>,
    image: Arc<dyn ImageEditing>,
    config: GenerationConfig,
    call_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        text: Arc<dyn TextGeneration>,
        image: Arc<dyn ImageEditing>,
        config: GenerationConfig,
    ) -> Self {
        let call_timeout = config.call_timeout();
        Self {
            text,
            image,
            config,
            call_timeout,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Expects a request that already passed `GenerationRequest::validate`.
    /// The only error path out of here is an unusable image result.
    pub async fn generate_all(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let GenerationRequest {
            photo,
            keywords,
            tone,
        } = request;

        let image_prompt = lifestyle_prompt(&tone);

        // The two calls have no data dependency, so they run concurrently
        // and join here.
        let ((story, social), image_result) = tokio::join!(
            self.story_and_social(&keywords, &tone),
            self.magic_photoshoot(photo, &image_prompt)
        );

        let image_bytes = image_result
            .ok_or_else(|| ModelError::Response("no usable image was produced".into()))?;

        Ok(GenerationResponse {
            story,
            social,
            magic_photo: BASE64.encode(image_bytes),
        })
    }

    /// Generates the product story and the social caption from one model
    /// call. Never fails: any error on this side degrades to the fixed
    /// placeholder strings.
    async fn story_and_social(&self, keywords: &str, tone: &str) -> (String, String) {
        let request = TextGenerationRequest {
            prompt: story_social_prompt(keywords, tone),
            max_tokens: Some(512),
            temperature: Some(0.7),
            model_id: Some(self.config.text_model_id().to_string()),
        };

        let text = match self
            .with_deadline("text generation", self.text.generate(request))
            .await
        {
            Ok(response) => Some(response.text),
            Err(e) => {
                log::error!("Text generation failed: {}", e);
                None
            }
        };

        let sections = text.as_deref().and_then(split_sections);
        if text.is_some() && sections.is_none() {
            log::warn!(
                "Text response missing {} / {} markers, using placeholders",
                STORY_MARKER,
                SOCIAL_MARKER
            );
        }

        sections.unwrap_or_else(|| (STORY_FALLBACK.to_string(), SOCIAL_FALLBACK.to_string()))
    }

    /// Produces the staged product image, or `None` when anything on the
    /// image side goes wrong. The caller decides what an absent image means.
    async fn magic_photoshoot(&self, photo: Vec<u8>, prompt: &str) -> Option<Vec<u8>> {
        let request = ImageEditRequest {
            prompt: prompt.to_string(),
            base_image: photo,
            model_id: Some(self.config.image_model_id().to_string()),
            sample_count: Some(IMAGE_SAMPLE_COUNT),
            guidance_scale: Some(IMAGE_GUIDANCE_SCALE),
        };

        match self
            .with_deadline("image edit", self.image.edit(request))
            .await
        {
            Ok(response) if response.image_bytes.is_empty() => {
                log::error!("Image edit returned an empty image");
                None
            }
            Ok(response) => Some(response.image_bytes),
            Err(e) => {
                log::error!("Image edit failed: {}", e);
                None
            }
        }
    }

    async fn with_deadline<T>(
        &self,
        what: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::DeadlineExceeded(format!(
                "{} did not finish within {:?}",
                what, self.call_timeout
            ))),
        }
    }
}

fn story_social_prompt(keywords: &str, tone: &str) -> String {
    format!(
        "You are an expert marketing storyteller for independent artisans.\n\
         Your task is to write two pieces of content based on the details below:\n\
         1. A product description.\n\
         2. A short, engaging Instagram caption.\n\
         \n\
         Instructions:\n\
         - Keywords for inspiration: {keywords}\n\
         - Desired tone: {tone}\n\
         - The product description should be 80-100 words, focusing on heritage and craftsmanship.\n\
         - The Instagram caption should be short (2-3 sentences), use 1-2 relevant emojis, and include 3-4 relevant hashtags.\n\
         - Structure your response with \"STORY:\" on one line, followed by the description, and \"SOCIAL:\" on another line, followed by the caption."
    )
}

pub(crate) fn lifestyle_prompt(tone: &str) -> String {
    format!(
        "The uploaded product placed in a professional, high-quality, {} lifestyle setting. \
         The background should be clean and well-lit to showcase the product.",
        tone.to_lowercase()
    )
}

/// Splits a model response on the two fixed markers. `None` when either
/// marker is missing or they appear out of order.
fn split_sections(text: &str) -> Option<(String, String)> {
    let (_, after_story) = text.split_once(STORY_MARKER)?;
    let (story, social) = after_story.split_once(SOCIAL_MARKER)?;
    Some((story.trim().to_string(), social.trim().to_string()))
}
