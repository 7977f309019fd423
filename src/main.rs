use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod aws;
mod changes;
mod config;
mod directive;
mod dispatcher;
mod error;
mod models;
mod overrides;
#[cfg(test)]
mod testing;
mod webhook;

use auth::HookAllowList;
use aws::{BatchJobQueue, SecretsManagerStore};
use config::Config;
use webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let state = AppState {
        allow_list: Arc::new(HookAllowList::new(
            Arc::new(SecretsManagerStore::new(&aws_config)),
            config.allowed_hooks_secret_id.clone(),
        )),
        jobs: Arc::new(BatchJobQueue::new(&aws_config)),
        settings: Arc::new(config.jobs.clone()),
    };

    let app = webhook::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Webhook receiver listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
