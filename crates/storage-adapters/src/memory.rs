//! In-process record store backed by `DashMap`.
//!
//! `replace_if_version` holds the entry's shard write lock for the whole
//! compare-and-swap, which is what makes it atomic. Username and email
//! uniqueness is enforced through the entry API of two index maps.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{Tweet, TweetFilter, TweetRepository, User, UserRepository};
use uuid::Uuid;

use crate::StoreConflict;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    usernames: DashMap<String, Uuid>,
    emails: DashMap<String, Uuid>,
    tweets: DashMap<Uuid, Tweet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(index: &DashMap<String, Uuid>, field: &'static str, key: &str, id: Uuid) -> Result<(), StoreConflict> {
        match index.entry(key.to_string()) {
            Entry::Occupied(_) => Err(StoreConflict::Duplicate(field, key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn get_users(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        Ok(ids.iter().filter_map(|id| self.users.get(id).map(|u| u.clone())).collect())
    }

    async fn insert_user(&self, user: User) -> anyhow::Result<()> {
        // The vacant id slot stays locked until the user is written, so
        // index reservations for one id never interleave.
        let slot = match self.users.entry(user.id) {
            Entry::Occupied(_) => return Err(StoreConflict::Duplicate("user id", user.id.to_string()).into()),
            Entry::Vacant(slot) => slot,
        };
        Self::reserve(&self.usernames, "username", &user.username, user.id)?;
        if let Err(err) = Self::reserve(&self.emails, "email", &user.email, user.id) {
            self.usernames.remove(&user.username);
            return Err(err.into());
        }
        slot.insert(user);
        Ok(())
    }
}

#[async_trait]
impl TweetRepository for MemoryStore {
    async fn insert_tweet(&self, tweet: Tweet) -> anyhow::Result<()> {
        match self.tweets.entry(tweet.id) {
            Entry::Occupied(_) => Err(StoreConflict::Duplicate("tweet id", tweet.id.to_string()).into()),
            Entry::Vacant(slot) => {
                slot.insert(tweet);
                Ok(())
            }
        }
    }

    async fn get_tweet(&self, id: Uuid) -> anyhow::Result<Option<Tweet>> {
        Ok(self.tweets.get(&id).map(|t| t.clone()))
    }

    async fn list_tweets(&self, filter: TweetFilter) -> anyhow::Result<Vec<Tweet>> {
        Ok(self
            .tweets
            .iter()
            .filter(|t| filter.matches(t.value()))
            .map(|t| t.value().clone())
            .collect())
    }

    async fn replace_if_version(&self, tweet: &Tweet, expected_version: u64) -> anyhow::Result<bool> {
        let Some(mut stored) = self.tweets.get_mut(&tweet.id) else {
            return Ok(false);
        };
        if stored.version != expected_version {
            return Ok(false);
        }
        stored.liked_by = tweet.liked_by.clone();
        stored.retweeted_by = tweet.retweeted_by.clone();
        stored.version = expected_version + 1;
        Ok(true)
    }
}
