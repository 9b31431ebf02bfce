//! Backend entry point: configuration, tracing, and server start-up.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use librarium::server::{self, AppConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env()?;
    tracing::info!(
        addr = %config.bind_addr,
        database = config.database_url.is_some(),
        "librarium starting"
    );

    server::run(config).await?.await
}
