use anyhow::Context;
use shop_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = setup_environment()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to load configuration")?;

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Shop server starting"
    );

    let state = ServerState::initialize(config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize server state")?;

    Server::new(state)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("server error")?;

    Ok(())
}
