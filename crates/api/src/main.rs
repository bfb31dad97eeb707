use anyhow::Context;
use axum::Router;

use starter_infra::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    starter_observability::init();

    let config = Config::from_env().context("reading configuration")?;
    tracing::info!(
        environment = %config.environment,
        debug = config.debug,
        sync_failure_policy = ?config.sync_failure_policy,
        "starting api"
    );

    let services = starter_api::app::build_services(&config).await?;
    // application routes are mounted by the project built on this template
    let app = starter_api::app::build_app(services, Router::new());

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
