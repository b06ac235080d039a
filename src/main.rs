use std::sync::Arc;

use craftgen::logger::LoggerConfig;
use craftgen::{logger, server, BedrockClient, Config, Orchestrator};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before the logger so LOG_LEVEL from the file is honored.
    let dotenv_result = dotenv::dotenv();

    logger::init_with_config(LoggerConfig::from_env())?;

    match dotenv_result {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    logger::log_startup_info("craftgen", env!("CARGO_PKG_VERSION"), config.port());

    log::info!("🔄 Creating Bedrock client...");
    let bedrock = match BedrockClient::new(config.bedrock.clone().unwrap_or_default()).await {
        Ok(client) => {
            log::info!("✅ Bedrock client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize Bedrock client: {}", e);
            return Err(e.into());
        }
    };

    log::info!(
        "⚙️  Text model: {}, image model: {}, call deadline: {:?}",
        config.generation.text_model_id(),
        config.generation.image_model_id(),
        config.generation.call_timeout()
    );

    let orchestrator = Orchestrator::new(
        Arc::new(bedrock.text().clone()),
        Arc::new(bedrock.image().clone()),
        config.generation.clone(),
    );

    server::run(config, orchestrator).await?;

    Ok(())
}
