use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{Level, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file.
    // A missing .env is fine: the process environment is used as-is.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .init();

    if let Err(e) = api::start().await {
        error!(code = e.error_code(), error = %e, "ad-copy API failed");
        return Err(e.into());
    }

    Ok(())
}
