use anyhow::Context;

use nickbase_api::app::{self, AppServices};
use nickbase_api::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nickbase_observability::init();

    let settings = Settings::from_env()?;
    let services = AppServices::from_settings(&settings).await?;
    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
