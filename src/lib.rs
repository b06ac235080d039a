pub mod bedrock;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod server;

pub use bedrock::{BedrockClient, ImageClient, TextClient};
pub use capabilities::{ImageEditing, TextGeneration};
pub use config::{BedrockConfig, Config, GenerationConfig};
pub use error::{ModelError, Result};
pub use models::*;
pub use orchestrator::Orchestrator;
