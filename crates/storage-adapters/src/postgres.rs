//! # Postgres record store
//!
//! Maps the `users` and `tweets` tables onto the domain models. Reaction sets are
//! `uuid[]` columns; `likes`/`retweets` are generated columns and never written.
//!
//! The compare-and-swap is a single `UPDATE ... WHERE id = $1 AND version = $2`,
//! so Postgres row locking decides which of two racing toggles wins.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use domains::{Tweet, TweetFilter, TweetRepository, User, UserRepository};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::StoreConflict;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const UNIQUE_VIOLATION: &str = "23505";

const TWEET_COLUMNS: &str =
    r#"id, author_id, content, image, "timestamp", liked_by, retweeted_by, comments, version"#;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .context("connecting to postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        MIGRATOR.run(&self.pool).await.context("running migrations")?;
        info!("database migrations applied");
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> anyhow::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
        notifications_enabled: row.try_get("notifications_enabled")?,
    })
}

fn tweet_from_row(row: &PgRow) -> anyhow::Result<Tweet> {
    Ok(Tweet {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        image: row.try_get("image")?,
        timestamp: row.try_get("timestamp")?,
        liked_by: row.try_get::<Vec<Uuid>, _>("liked_by")?.into_iter().collect(),
        retweeted_by: row.try_get::<Vec<Uuid>, _>("retweeted_by")?.into_iter().collect(),
        comments: u64::try_from(row.try_get::<i64, _>("comments")?)?,
        version: u64::try_from(row.try_get::<i64, _>("version")?)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, display_name, email, avatar, notifications_enabled FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_users(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        sqlx::query(
            "SELECT id, username, display_name, email, avatar, notifications_enabled FROM users WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(user_from_row)
        .collect()
    }

    async fn insert_user(&self, user: User) -> anyhow::Result<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, display_name, email, avatar, notifications_enabled) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(user.notifications_enabled)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreConflict::Duplicate("user", user.username).into()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl TweetRepository for PgStore {
    async fn insert_tweet(&self, tweet: Tweet) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO tweets (id, author_id, content, image, "timestamp", liked_by, retweeted_by, comments, version)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(tweet.id)
        .bind(tweet.author_id)
        .bind(&tweet.content)
        .bind(&tweet.image)
        .bind(tweet.timestamp)
        .bind(tweet.liked_by.iter().copied().collect::<Vec<Uuid>>())
        .bind(tweet.retweeted_by.iter().copied().collect::<Vec<Uuid>>())
        .bind(i64::try_from(tweet.comments)?)
        .bind(i64::try_from(tweet.version)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_tweet(&self, id: Uuid) -> anyhow::Result<Option<Tweet>> {
        let row = sqlx::query(&format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(tweet_from_row).transpose()
    }

    async fn list_tweets(&self, filter: TweetFilter) -> anyhow::Result<Vec<Tweet>> {
        sqlx::query(&format!(
            r#"SELECT {TWEET_COLUMNS} FROM tweets
               WHERE ($1::uuid IS NULL OR author_id = $1)
               ORDER BY "timestamp" DESC, id DESC"#
        ))
        .bind(filter.author_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(tweet_from_row)
        .collect()
    }

    async fn replace_if_version(&self, tweet: &Tweet, expected_version: u64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE tweets SET liked_by = $3, retweeted_by = $4, version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(tweet.id)
        .bind(i64::try_from(expected_version)?)
        .bind(tweet.liked_by.iter().copied().collect::<Vec<Uuid>>())
        .bind(tweet.retweeted_by.iter().copied().collect::<Vec<Uuid>>())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
