//! # Domain Models
//!
//! These structs represent the core entities of rusty-feed.
//! We use UUID v7 for time-ordered, globally unique identification; a tweet id
//! therefore doubles as its creation sequence.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, Result};

pub type UserId = Uuid;
pub type TweetId = Uuid;

/// A registered account. Created and edited by the external registration system;
/// the core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, immutable after creation
    pub username: String,
    pub display_name: String,
    /// Unique
    pub email: String,
    pub avatar: Option<String>,
    pub notifications_enabled: bool,
}

impl User {
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// The author fields joined onto a tweet in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

/// Which reaction set a toggle acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Like,
    Retweet,
}

impl Interaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Interaction::Like => "like",
            Interaction::Retweet => "retweet",
        }
    }
}

/// A posted item.
///
/// `likes` and `retweets` are never stored separately: they are the sizes of
/// `liked_by` and `retweeted_by`, so the counters cannot drift from the sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
    pub image: Option<String>,
    /// Set once at creation
    pub timestamp: DateTime<Utc>,
    pub liked_by: BTreeSet<UserId>,
    pub retweeted_by: BTreeSet<UserId>,
    /// Maintained by the external comment system
    pub comments: u64,
    /// Bumped by the store on every successful replace
    pub version: u64,
}

impl Tweet {
    /// Builds a fresh tweet for `draft`, stamped with `now` truncated to whole
    /// microseconds, the finest precision every record store keeps.
    pub fn new(draft: NewTweet, now: DateTime<Utc>) -> Self {
        let timestamp = now.duration_trunc(Duration::microseconds(1)).unwrap_or(now);
        Self {
            id: Uuid::now_v7(),
            author_id: draft.author_id,
            content: draft.content,
            image: draft.image,
            timestamp,
            liked_by: BTreeSet::new(),
            retweeted_by: BTreeSet::new(),
            comments: 0,
            version: 0,
        }
    }

    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn retweets(&self) -> usize {
        self.retweeted_by.len()
    }

    pub fn members(&self, kind: Interaction) -> &BTreeSet<UserId> {
        match kind {
            Interaction::Like => &self.liked_by,
            Interaction::Retweet => &self.retweeted_by,
        }
    }

    /// Adds `user` to the set for `kind` if absent, removes it if present.
    /// Returns `true` when the user is a member afterwards.
    pub fn toggle(&mut self, kind: Interaction, user: UserId) -> bool {
        let set = match kind {
            Interaction::Like => &mut self.liked_by,
            Interaction::Retweet => &mut self.retweeted_by,
        };
        if set.remove(&user) {
            false
        } else {
            set.insert(user);
            true
        }
    }

    /// Feed order: newest first, later creation sequence first on equal timestamps.
    pub fn feed_order(a: &Tweet, b: &Tweet) -> std::cmp::Ordering {
        b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
    }
}

/// A validated request to post a tweet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTweet {
    pub author_id: UserId,
    pub content: String,
    pub image: Option<String>,
}

impl NewTweet {
    /// Validates raw caller input.
    ///
    /// `author_id` and `content` are required; content is trimmed and must not be
    /// blank afterwards. A blank `image` is treated as no image.
    pub fn parse(author_id: Option<&str>, content: Option<&str>, image: Option<&str>) -> Result<Self> {
        let author_id = parse_id("authorId", author_id)?;
        let content = content.map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(DomainError::Validation("authorId and content are required".into()));
        }
        let image = image.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Self {
            author_id,
            content: content.to_string(),
            image,
        })
    }
}

/// Parses a required id field, rejecting missing, blank and malformed values.
pub fn parse_id(field: &str, raw: Option<&str>) -> Result<Uuid> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(DomainError::Validation(format!("{field} is required")));
    }
    Uuid::parse_str(raw).map_err(|_| DomainError::Validation(format!("{field} is not a valid id: {raw}")))
}

/// Record-store query for tweets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TweetFilter {
    pub author_id: Option<UserId>,
}

impl TweetFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_author(author_id: UserId) -> Self {
        Self {
            author_id: Some(author_id),
        }
    }

    pub fn matches(&self, tweet: &Tweet) -> bool {
        self.author_id.is_none_or(|id| tweet.author_id == id)
    }
}

/// A tweet joined with its author, as presented in a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub tweet: Tweet,
    pub author: AuthorSummary,
}

/// Raised when a notification-enabled author posts about a watched keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub author_id: UserId,
    pub tweet_id: TweetId,
    pub content: String,
    /// The first configured keyword found in the content
    pub keyword: String,
}
