//! Seeds a Postgres store with demo accounts and a few tweets.
//!
//! Accounts are normally created by the external registration service; this
//! exists so a fresh database has someone to post as. Re-running is harmless:
//! accounts that already exist are skipped along with their tweets.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use configs::Settings;
use domains::{NewTweet, Tweet, TweetRepository, User, UserRepository};
use secrecy::ExposeSecret;
use storage_adapters::{PgStore, StoreConflict};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

struct DemoAccount {
    username: &'static str,
    display_name: &'static str,
    notifications_enabled: bool,
    tweets: &'static [&'static str],
}

const ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        username: "ravi",
        display_name: "Ravi Kumar",
        notifications_enabled: true,
        tweets: &["Great Cricket match today", "Reading some science news over coffee"],
    },
    DemoAccount {
        username: "meera",
        display_name: "Meera Shah",
        notifications_enabled: false,
        tweets: &["Shipping a new feature this week"],
    },
    DemoAccount {
        username: "lurker",
        display_name: "Quiet Reader",
        notifications_enabled: false,
        tweets: &[],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load()?;
    let url = settings
        .store
        .database_url
        .as_ref()
        .context("set DATABASE_URL or RUSTY_FEED__STORE__DATABASE_URL")?;
    let store = PgStore::connect(
        url.expose_secret(),
        settings.store.max_connections,
        Duration::from_secs(settings.store.acquire_timeout_secs),
    )
    .await?;
    store.migrate().await?;

    for account in ACCOUNTS {
        let user = User {
            id: Uuid::now_v7(),
            username: account.username.to_string(),
            display_name: account.display_name.to_string(),
            email: format!("{}@example.com", account.username),
            avatar: None,
            notifications_enabled: account.notifications_enabled,
        };
        match store.insert_user(user.clone()).await {
            Ok(()) => {}
            Err(err) if err.downcast_ref::<StoreConflict>().is_some() => {
                info!(username = account.username, "account exists, skipping");
                continue;
            }
            Err(err) => return Err(err),
        }

        for content in account.tweets {
            let draft = NewTweet {
                author_id: user.id,
                content: content.to_string(),
                image: None,
            };
            store.insert_tweet(Tweet::new(draft, Utc::now())).await?;
        }
        info!(username = account.username, id = %user.id, tweets = account.tweets.len(), "seeded account");
    }

    Ok(())
}
