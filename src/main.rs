use anyhow::Context;
use tradebridge::core::config::GatewayConfig;
use tradebridge::gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env().context("gateway configuration")?;
    gateway::serve(config).await.context("gateway server")?;

    Ok(())
}
