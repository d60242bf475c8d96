use std::sync::Arc;

use anyhow::Context;

use stockrecon_infra::ReconConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ReconConfig::from_env().context("invalid configuration")?;
    stockrecon_observability::init(config.log_format);

    let services = stockrecon_api::app::services::build_in_memory_services(&config)
        .context("failed to build services")?;
    let app = stockrecon_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
