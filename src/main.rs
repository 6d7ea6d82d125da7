use live_chat::config::AppConfig;
use live_chat::{server, telemetry};

#[tokio::main]
async fn main() -> Result<(), server::BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config.server)?;

    tracing::info!(
        environment = ?config.server.environment,
        database = config.database.is_some(),
        "Starting live chat"
    );

    server::run(config).await
}
