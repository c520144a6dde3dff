//! # rusty-feed binary
//!
//! Assembles the application from configuration and compile-time features.

use std::sync::Arc;
#[cfg(feature = "db-postgres")]
use std::time::Duration;

#[cfg(feature = "db-postgres")]
use anyhow::Context;
use api_adapters::AppState;
use configs::{LogFormat, LogSettings, Settings, StoreBackend, StoreSettings};
use domains::{TweetRepository, UserRepository};
#[cfg(feature = "db-postgres")]
use secrecy::ExposeSecret;
use services::{KeywordDetector, TracingDetectionSink};
use storage_adapters::MemoryStore;
#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(not(feature = "web-axum"))]
compile_error!("the rusty-feed binary needs the web-axum feature");

type Stores = (Arc<dyn TweetRepository>, Arc<dyn UserRepository>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings.log);

    let (tweets, users) = build_store(&settings.store).await?;
    let detector = KeywordDetector::new(&settings.notifications.keywords);
    info!(keywords = ?detector.keywords(), "keyword detection configured");

    let state = AppState::new(
        tweets,
        users,
        Arc::new(TracingDetectionSink),
        detector,
        settings.interactions.max_toggle_retries,
    );

    let listener = tokio::net::TcpListener::bind(settings.server.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "rusty-feed listening");

    axum::serve(listener, api_adapters::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("rusty-feed stopped");
    Ok(())
}

async fn build_store(store: &StoreSettings) -> anyhow::Result<Stores> {
    match store.backend {
        StoreBackend::Memory => {
            warn!("using the in-memory store; records are lost on restart");
            let memory = Arc::new(MemoryStore::new());
            let tweets: Arc<dyn TweetRepository> = memory.clone();
            let users: Arc<dyn UserRepository> = memory;
            Ok((tweets, users))
        }
        #[cfg(feature = "db-postgres")]
        StoreBackend::Postgres => {
            let url = store
                .database_url
                .as_ref()
                .context("store.database_url is required for postgres")?;
            let pg = Arc::new(
                PgStore::connect(
                    url.expose_secret(),
                    store.max_connections,
                    Duration::from_secs(store.acquire_timeout_secs),
                )
                .await?,
            );
            pg.migrate().await?;
            info!(max_connections = store.max_connections, "connected to postgres");
            let tweets: Arc<dyn TweetRepository> = pg.clone();
            let users: Arc<dyn UserRepository> = pg;
            Ok((tweets, users))
        }
        #[cfg(not(feature = "db-postgres"))]
        StoreBackend::Postgres => anyhow::bail!("this build lacks the db-postgres feature"),
    }
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    match log.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c; shutting down");
    }
}
