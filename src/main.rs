use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine in deployments that inject the environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter("info,api=debug"))
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => warn!("no .env file found; using process environment"),
        Err(e) => return Err(e.into()),
    }

    api::start().await?;

    Ok(())
}
