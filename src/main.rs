use pagemeta::config::AppConfig;
use pagemeta::server::ServerBuilder;
use pagemeta::storage::InMemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagemeta=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    ServerBuilder::new()
        .with_store(InMemoryStore::new())
        .with_config(config)
        .serve()
        .await
}
