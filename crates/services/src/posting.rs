//! Tweet creation.

use std::sync::Arc;

use chrono::Utc;
use domains::{DetectionEvent, DetectionSink, DomainError, NewTweet, Result, Tweet, TweetRepository, UserRepository};
use tracing::{info, warn};

use crate::notification::KeywordDetector;

/// A stored tweet and the detection it raised, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub tweet: Tweet,
    pub detection: Option<DetectionEvent>,
}

pub struct PostingService {
    tweets: Arc<dyn TweetRepository>,
    users: Arc<dyn UserRepository>,
    detector: KeywordDetector,
    sink: Arc<dyn DetectionSink>,
}

impl PostingService {
    pub fn new(
        tweets: Arc<dyn TweetRepository>,
        users: Arc<dyn UserRepository>,
        detector: KeywordDetector,
        sink: Arc<dyn DetectionSink>,
    ) -> Self {
        Self {
            tweets,
            users,
            detector,
            sink,
        }
    }

    /// Stores a new tweet with empty reaction sets, then runs keyword detection.
    ///
    /// The author must exist. A sink failure is logged and does not undo the post.
    #[tracing::instrument(skip(self, draft), fields(author_id = %draft.author_id))]
    pub async fn create(&self, draft: NewTweet) -> Result<Posted> {
        let author = self
            .users
            .get_user(draft.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", draft.author_id))?;

        let tweet = Tweet::new(draft, Utc::now());
        self.tweets.insert_tweet(tweet.clone()).await?;
        info!(tweet_id = %tweet.id, "tweet posted");

        let detection = self.detector.evaluate(&tweet, &author);
        if let Some(event) = &detection {
            if let Err(err) = self.sink.publish(event.clone()).await {
                warn!(tweet_id = %tweet.id, error = %err, "detection delivery failed");
            }
        }

        Ok(Posted { tweet, detection })
    }
}
