//! Shared fixtures for the integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domains::{DetectionEvent, DetectionSink, User, UserRepository};
use storage_adapters::MemoryStore;
use uuid::Uuid;

/// Keeps every published detection for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DetectionEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DetectionEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetectionSink for RecordingSink {
    async fn publish(&self, event: DetectionEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub fn user(username: &str, notifications_enabled: bool) -> User {
    User {
        id: Uuid::now_v7(),
        username: username.to_string(),
        display_name: format!("{username} (display)"),
        email: format!("{username}@example.com"),
        avatar: Some(format!("https://avatars.example.com/{username}.png")),
        notifications_enabled,
    }
}

pub async fn seed_user(store: &MemoryStore, username: &str, notifications_enabled: bool) -> User {
    let user = user(username, notifications_enabled);
    store.insert_user(user.clone()).await.unwrap();
    user
}

#[cfg(feature = "web-axum")]
pub use http::TestApp;

#[cfg(feature = "web-axum")]
mod http {
    use std::sync::Arc;

    use api_adapters::AppState;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use domains::TweetRepository;
    use serde_json::Value;
    use services::{KeywordDetector, DEFAULT_MAX_TOGGLE_ATTEMPTS};
    use storage_adapters::MemoryStore;
    use tower::ServiceExt;

    use super::RecordingSink;

    /// The full router over a fresh in-memory store.
    pub struct TestApp {
        pub store: Arc<MemoryStore>,
        pub sink: Arc<RecordingSink>,
        router: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            Self::with_tweet_store(store.clone(), store, DEFAULT_MAX_TOGGLE_ATTEMPTS)
        }

        /// Serves tweets from `tweets` while users (and `seed_user`) stay on `store`.
        pub fn with_tweet_store(
            store: Arc<MemoryStore>,
            tweets: Arc<dyn TweetRepository>,
            max_toggle_attempts: u32,
        ) -> Self {
            let sink = Arc::new(RecordingSink::default());
            let state = AppState::new(
                tweets,
                store.clone(),
                sink.clone(),
                KeywordDetector::default(),
                max_toggle_attempts,
            );
            Self {
                store,
                sink,
                router: api_adapters::router(state),
            }
        }

        /// Sends one request and decodes the JSON body (`Null` when empty,
        /// a JSON string when the body is not JSON).
        pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };

            let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
            };
            (status, json)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.request(Method::GET, uri, None).await
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.request(Method::POST, uri, Some(body)).await
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Convenience for tests that drive services directly.
pub fn shared_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
