//! Like/retweet toggles.
//!
//! A toggle is a read-modify-write on one tweet's reaction set. Every write goes
//! through [`TweetRepository::replace_if_version`], so two concurrent toggles can
//! never both apply to the same prior state: the loser re-reads and applies its
//! toggle on top of the winner's result.

use std::sync::Arc;

use domains::{DomainError, Interaction, Result, Tweet, TweetId, TweetRepository, UserId, UserRepository};
use tracing::{debug, warn};

pub const DEFAULT_MAX_TOGGLE_ATTEMPTS: u32 = 16;

/// The post-toggle tweet and whether the user is now in the toggled set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub tweet: Tweet,
    pub member: bool,
}

pub struct InteractionService {
    tweets: Arc<dyn TweetRepository>,
    users: Arc<dyn UserRepository>,
    max_attempts: u32,
}

impl InteractionService {
    /// `max_attempts` bounds the compare-and-swap loop; values below one are raised to one.
    pub fn new(tweets: Arc<dyn TweetRepository>, users: Arc<dyn UserRepository>, max_attempts: u32) -> Self {
        Self {
            tweets,
            users,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn toggle_like(&self, tweet_id: TweetId, user_id: UserId) -> Result<Toggled> {
        self.toggle(Interaction::Like, tweet_id, user_id).await
    }

    pub async fn toggle_retweet(&self, tweet_id: TweetId, user_id: UserId) -> Result<Toggled> {
        self.toggle(Interaction::Retweet, tweet_id, user_id).await
    }

    #[tracing::instrument(skip(self, kind), fields(kind = kind.as_str()))]
    pub async fn toggle(&self, kind: Interaction, tweet_id: TweetId, user_id: UserId) -> Result<Toggled> {
        if user_id.is_nil() {
            return Err(DomainError::Validation("userId is required".into()));
        }
        if self.users.get_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("User", user_id));
        }

        for attempt in 1..=self.max_attempts {
            let mut tweet = self
                .tweets
                .get_tweet(tweet_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Tweet", tweet_id))?;

            let expected = tweet.version;
            let member = tweet.toggle(kind, user_id);

            if self.tweets.replace_if_version(&tweet, expected).await? {
                tweet.version = expected + 1;
                debug!(attempt, member, count = tweet.members(kind).len(), "toggle applied");
                return Ok(Toggled { tweet, member });
            }

            debug!(attempt, expected, "tweet changed underneath toggle, retrying");
            tokio::task::yield_now().await;
        }

        warn!(attempts = self.max_attempts, "toggle retries exhausted");
        Err(DomainError::Conflict(format!(
            "{} on tweet {tweet_id} lost {} consecutive races",
            kind.as_str(),
            self.max_attempts
        )))
    }
}
