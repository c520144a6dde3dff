//! # Ports
//!
//! Any storage or delivery adapter must implement these traits to be wired
//! into the binary. Ports report failures as `anyhow::Error`; services decide
//! what they mean.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{DetectionEvent, Tweet, TweetFilter, User};

/// Read access to user records. Registration and profile edits are owned elsewhere;
/// `insert_user` exists for seeding and tests.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Fetches every user in `ids` that exists. Order is unspecified.
    async fn get_users(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;

    /// Fails if the id, username or email is already taken.
    async fn insert_user(&self, user: User) -> anyhow::Result<()>;
}

/// Persistence contract for tweets.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TweetRepository: Send + Sync {
    async fn insert_tweet(&self, tweet: Tweet) -> anyhow::Result<()>;

    /// Returns the tweet together with its current `version`.
    async fn get_tweet(&self, id: Uuid) -> anyhow::Result<Option<Tweet>>;

    /// Every tweet matching `filter`. Order is unspecified.
    async fn list_tweets(&self, filter: TweetFilter) -> anyhow::Result<Vec<Tweet>>;

    /// Compare-and-swap. Writes the reaction sets of `tweet` only if the stored
    /// version still equals `expected_version`, bumping the stored version by one.
    /// Author, content, image, timestamp and the comment count are never
    /// rewritten; comments belong to the external comment system. Returns `false` when another writer got there first or the
    /// tweet no longer exists.
    async fn replace_if_version(&self, tweet: &Tweet, expected_version: u64) -> anyhow::Result<bool>;
}

/// Downstream delivery of keyword detections (push, webhook, ...).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DetectionSink: Send + Sync {
    async fn publish(&self, event: DetectionEvent) -> anyhow::Result<()>;
}
