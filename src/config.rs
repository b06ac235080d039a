use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

/// Settings for the two generation calls made per request. Model ids fall
/// back to the defaults below when unset; the deadline caps each external
/// call so a hanging model cannot block a request forever.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub text_model_id: Option<String>,
    pub image_model_id: Option<String>,
    pub call_timeout_secs: Option<u64>,
}

pub const DEFAULT_TEXT_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_IMAGE_MODEL_ID: &str = "stability.stable-diffusion-xl-v1";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            text_model_id: None,
            image_model_id: None,
            call_timeout_secs: None,
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let text_model_id = env::var("TEXT_MODEL_ID").ok();
        let image_model_id = env::var("IMAGE_MODEL_ID").ok();
        let call_timeout_secs = env::var("CALL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        GenerationConfig {
            text_model_id,
            image_model_id,
            call_timeout_secs,
        }
    }

    pub fn with_text_model(mut self, model_id: impl Into<String>) -> Self {
        self.text_model_id = Some(model_id.into());
        self
    }

    pub fn with_image_model(mut self, model_id: impl Into<String>) -> Self {
        self.image_model_id = Some(model_id.into());
        self
    }

    pub fn with_call_timeout(mut self, secs: u64) -> Self {
        self.call_timeout_secs = Some(secs);
        self
    }

    pub fn text_model_id(&self) -> &str {
        self.text_model_id.as_deref().unwrap_or(DEFAULT_TEXT_MODEL_ID)
    }

    pub fn image_model_id(&self) -> &str {
        self.image_model_id
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_MODEL_ID)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.unwrap_or(DEFAULT_CALL_TIMEOUT_SECS))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub bedrock: Option<BedrockConfig>,
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            bedrock: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            bedrock: Some(BedrockConfig::from_env()),
            generation: GenerationConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = Some(config);
        self
    }

    pub fn with_generation(mut self, config: GenerationConfig) -> Self {
        self.generation = config;
        self
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(5000)
    }
}
