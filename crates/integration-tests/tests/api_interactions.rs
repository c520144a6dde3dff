//! Like/retweet toggles over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use domains::{Tweet, TweetFilter, TweetRepository};
use integration_tests::{seed_user, TestApp};
use serde_json::{json, Value};
use storage_adapters::MemoryStore;
use uuid::Uuid;

/// A tweet store where every compare-and-swap loses to some other writer.
struct AlwaysOutraced(Arc<MemoryStore>);

#[async_trait]
impl TweetRepository for AlwaysOutraced {
    async fn insert_tweet(&self, tweet: Tweet) -> anyhow::Result<()> {
        self.0.insert_tweet(tweet).await
    }

    async fn get_tweet(&self, id: Uuid) -> anyhow::Result<Option<Tweet>> {
        self.0.get_tweet(id).await
    }

    async fn list_tweets(&self, filter: TweetFilter) -> anyhow::Result<Vec<Tweet>> {
        self.0.list_tweets(filter).await
    }

    async fn replace_if_version(&self, _tweet: &Tweet, _expected_version: u64) -> anyhow::Result<bool> {
        Ok(false)
    }
}

async fn post_tweet(app: &TestApp, author: Uuid) -> String {
    let (status, tweet) = app.post("/api/tweet", json!({ "authorId": author, "content": "hello" })).await;
    assert_eq!(status, StatusCode::CREATED);
    tweet["id"].as_str().unwrap().to_string()
}

fn ids(v: &Value) -> Vec<String> {
    v.as_array().unwrap().iter().map(|id| id.as_str().unwrap().to_string()).collect()
}

#[tokio::test]
async fn like_unlike_relike_sequence() {
    let app = TestApp::new();
    let author = seed_user(&app.store, "author", false).await;
    let u2 = seed_user(&app.store, "u2", false).await;
    let u3 = seed_user(&app.store, "u3", false).await;
    let t1 = post_tweet(&app, author.id).await;
    let like = format!("/api/tweet/like/{t1}");

    let (status, tweet) = app.post(&like, json!({ "userId": u2.id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tweet["likes"], 1);

    let (_, tweet) = app.post(&like, json!({ "userId": u3.id })).await;
    assert_eq!(tweet["likes"], 2);

    let (status, tweet) = app.post(&like, json!({ "userId": u2.id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&tweet["likedBy"]), vec![u3.id.to_string()]);
    assert_eq!(tweet["likes"], 1);
}

#[tokio::test]
async fn toggling_twice_restores_the_original_state() {
    let app = TestApp::new();
    let author = seed_user(&app.store, "author", false).await;
    let fan = seed_user(&app.store, "fan", false).await;
    let t1 = post_tweet(&app, author.id).await;
    let retweet = format!("/api/tweet/retweet/{t1}");

    let (_, once) = app.post(&retweet, json!({ "userId": fan.id })).await;
    assert_eq!(once["retweets"], 1);
    assert_eq!(once["likes"], 0);

    let (_, twice) = app.post(&retweet, json!({ "userId": fan.id })).await;
    assert_eq!(twice["retweets"], 0);
    assert_eq!(twice["retweetedBy"], json!([]));
}

#[tokio::test]
async fn counters_match_sets_after_mixed_toggles() {
    let app = TestApp::new();
    let author = seed_user(&app.store, "author", false).await;
    let t1 = post_tweet(&app, author.id).await;
    let mut fans = Vec::new();
    for i in 0..5 {
        fans.push(seed_user(&app.store, &format!("fan{i}"), false).await);
    }

    for (i, fan) in fans.iter().enumerate() {
        let kind = if i % 2 == 0 { "like" } else { "retweet" };
        let (status, _) = app.post(&format!("/api/tweet/{kind}/{t1}"), json!({ "userId": fan.id })).await;
        assert_eq!(status, StatusCode::OK);
    }
    // fan0 takes their like back: 3 likes become 2
    let (_, last) = app.post(&format!("/api/tweet/like/{t1}"), json!({ "userId": fans[0].id })).await;

    assert_eq!(last["likes"], last["likedBy"].as_array().unwrap().len());
    assert_eq!(last["retweets"], last["retweetedBy"].as_array().unwrap().len());
    assert_eq!(last["likes"], 2);
    assert_eq!(last["retweets"], 2);

    let (_, feed) = app.get("/api/tweet").await;
    assert_eq!(feed[0]["likes"], 2);
    assert_eq!(feed[0]["retweets"], 2);
}

#[tokio::test]
async fn unknown_tweet_or_user_is_not_found() {
    let app = TestApp::new();
    let author = seed_user(&app.store, "author", false).await;
    let fan = seed_user(&app.store, "fan", false).await;
    let t1 = post_tweet(&app, author.id).await;

    let (status, body) = app
        .post(&format!("/api/tweet/like/{}", Uuid::now_v7()), json!({ "userId": fan.id }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app
        .post(&format!("/api/tweet/retweet/{t1}"), json!({ "userId": Uuid::now_v7() }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_or_malformed_ids_are_bad_requests() {
    let app = TestApp::new();
    let author = seed_user(&app.store, "author", false).await;
    let t1 = post_tweet(&app, author.id).await;

    let (status, body) = app.post(&format!("/api/tweet/like/{t1}"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let (status, _) = app.post(&format!("/api/tweet/like/{t1}"), json!({ "userId": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post(&format!("/api/tweet/like/{t1}"), json!({ "userId": Uuid::nil() })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/tweet/like/not-a-tweet", json!({ "userId": author.id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, feed) = app.get("/api/tweet").await;
    assert_eq!(feed[0]["likes"], 0);
}

#[tokio::test]
async fn toggles_are_counted_in_metrics() {
    let app = TestApp::new();
    let author = seed_user(&app.store, "author", false).await;
    let t1 = post_tweet(&app, author.id).await;
    app.post(&format!("/api/tweet/like/{t1}"), json!({ "userId": author.id })).await;
    app.post(&format!("/api/tweet/like/{t1}"), json!({ "userId": author.id })).await;

    let (_, body) = app.get("/metrics").await;
    let text = body.as_str().unwrap();
    assert!(text.contains(r#"toggles_total{kind="like",result="added"} 1"#));
    assert!(text.contains(r#"toggles_total{kind="like",result="removed"} 1"#));
}

#[tokio::test]
async fn exhausted_toggle_retries_are_a_conflict() {
    let store = Arc::new(MemoryStore::new());
    let app = TestApp::with_tweet_store(store.clone(), Arc::new(AlwaysOutraced(store.clone())), 2);
    let author = seed_user(&app.store, "author", false).await;
    let fan = seed_user(&app.store, "fan", false).await;
    let t1 = post_tweet(&app, author.id).await;

    let (status, body) = app.post(&format!("/api/tweet/like/{t1}"), json!({ "userId": fan.id })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, feed) = app.get("/api/tweet").await;
    assert_eq!(feed[0]["likes"], 0);
}
