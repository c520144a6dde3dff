//! Wire shapes. JSON keys are camelCase; counters are derived from the sets at
//! serialization time and the version stamp never leaves the server.

use chrono::{DateTime, Utc};
use domains::{AuthorSummary, FeedItem, Tweet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /api/tweet`. Fields are optional so that absence maps to a 400, not a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTweetRequest {
    pub author_id: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// `POST /api/tweet/{like,retweet}/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub likes: usize,
    pub retweets: usize,
    pub comments: u64,
    pub liked_by: Vec<Uuid>,
    pub retweeted_by: Vec<Uuid>,
}

impl From<&Tweet> for TweetResponse {
    fn from(t: &Tweet) -> Self {
        Self {
            id: t.id,
            author_id: t.author_id,
            content: t.content.clone(),
            image: t.image.clone(),
            timestamp: t.timestamp,
            likes: t.likes(),
            retweets: t.retweets(),
            comments: t.comments,
            liked_by: t.liked_by.iter().copied().collect(),
            retweeted_by: t.retweeted_by.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

impl From<&AuthorSummary> for AuthorResponse {
    fn from(a: &AuthorSummary) -> Self {
        Self {
            id: a.id,
            username: a.username.clone(),
            display_name: a.display_name.clone(),
            avatar: a.avatar.clone(),
        }
    }
}

/// A tweet with its author joined in place of `authorId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemResponse {
    pub id: Uuid,
    pub author: AuthorResponse,
    pub content: String,
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub likes: usize,
    pub retweets: usize,
    pub comments: u64,
    pub liked_by: Vec<Uuid>,
    pub retweeted_by: Vec<Uuid>,
}

impl From<&FeedItem> for FeedItemResponse {
    fn from(item: &FeedItem) -> Self {
        let t = &item.tweet;
        Self {
            id: t.id,
            author: AuthorResponse::from(&item.author),
            content: t.content.clone(),
            image: t.image.clone(),
            timestamp: t.timestamp,
            likes: t.likes(),
            retweets: t.retweets(),
            comments: t.comments,
            liked_by: t.liked_by.iter().copied().collect(),
            retweeted_by: t.retweeted_by.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Interaction, NewTweet};

    #[test]
    fn tweet_json_is_camel_case_with_derived_counters() {
        let mut tweet = Tweet::new(
            NewTweet {
                author_id: Uuid::now_v7(),
                content: "hello".into(),
                image: None,
            },
            Utc::now(),
        );
        tweet.toggle(Interaction::Like, Uuid::now_v7());
        tweet.version = 7;

        let json = serde_json::to_value(TweetResponse::from(&tweet)).unwrap();
        assert_eq!(json["likes"], 1);
        assert_eq!(json["retweets"], 0);
        assert_eq!(json["likedBy"].as_array().unwrap().len(), 1);
        assert_eq!(json["authorId"], tweet.author_id.to_string());
        assert!(json.get("version").is_none());
    }

    #[test]
    fn missing_request_fields_deserialize_as_none() {
        let req: CreateTweetRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(req.author_id.is_none());
        assert_eq!(req.content.as_deref(), Some("hi"));
    }
}
