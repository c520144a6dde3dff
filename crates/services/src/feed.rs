//! Feed assembly: fetch tweets, then resolve the referenced authors in one batch.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use domains::{AuthorSummary, FeedItem, Result, Tweet, TweetFilter, TweetRepository, UserId, UserRepository};
use tracing::warn;

pub struct FeedService {
    tweets: Arc<dyn TweetRepository>,
    users: Arc<dyn UserRepository>,
}

impl FeedService {
    pub fn new(tweets: Arc<dyn TweetRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { tweets, users }
    }

    /// Every tweet, newest first.
    pub async fn list_all(&self) -> Result<Vec<FeedItem>> {
        self.assemble(TweetFilter::all()).await
    }

    /// Tweets by one author, newest first. Unknown authors yield an empty feed.
    pub async fn list_by_author(&self, user_id: UserId) -> Result<Vec<FeedItem>> {
        self.assemble(TweetFilter::by_author(user_id)).await
    }

    async fn assemble(&self, filter: TweetFilter) -> Result<Vec<FeedItem>> {
        let mut tweets = self.tweets.list_tweets(filter).await?;
        if tweets.is_empty() {
            return Ok(Vec::new());
        }
        tweets.sort_by(Tweet::feed_order);

        let author_ids: Vec<UserId> = tweets
            .iter()
            .map(|t| t.author_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<UserId, AuthorSummary> = self
            .users
            .get_users(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.summary()))
            .collect();

        Ok(tweets
            .into_iter()
            .filter_map(|tweet| match authors.get(&tweet.author_id) {
                Some(author) => Some(FeedItem {
                    author: author.clone(),
                    tweet,
                }),
                None => {
                    warn!(tweet_id = %tweet.id, author_id = %tweet.author_id, "dropping tweet with unresolvable author");
                    None
                }
            })
            .collect())
    }
}
