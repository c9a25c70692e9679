use anyhow::Context;

use rentaldesk_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rentaldesk_observability::init();

    let config = AppConfig::from_env()?;
    let app = rentaldesk_api::app::build_app(&config).context("failed to build services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, policy = ?config.password_policy, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
