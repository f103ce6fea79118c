use marathon::Storage;
use marathon::platform::{Fitbit, Platform};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = marathon::config::Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database = ?cfg.database,
        fitbit_api = %cfg.fitbit.api_base,
        loglevel = %cfg.loglevel
    );

    let store = marathon::db::connect(&cfg.database).await?;
    store.init_schema().await?;

    let fitbit = Fitbit::new(Arc::clone(&store), &cfg.fitbit, cfg.client_timeout())?;
    info!(platform = fitbit.name(), "platform adapter ready");

    info!("credential store ready; waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    store.close().await;
    Ok(())
}
