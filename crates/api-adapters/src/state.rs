use std::sync::Arc;

use domains::{DetectionSink, TweetRepository, UserRepository};
use services::{FeedService, InteractionService, KeywordDetector, PostingService};

use crate::metrics::Metrics;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub posting: Arc<PostingService>,
    pub feed: Arc<FeedService>,
    pub interactions: Arc<InteractionService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires every service against the same record store.
    pub fn new(
        tweets: Arc<dyn TweetRepository>,
        users: Arc<dyn UserRepository>,
        sink: Arc<dyn DetectionSink>,
        detector: KeywordDetector,
        max_toggle_attempts: u32,
    ) -> Self {
        Self {
            posting: Arc::new(PostingService::new(tweets.clone(), users.clone(), detector, sink)),
            feed: Arc::new(FeedService::new(tweets.clone(), users.clone())),
            interactions: Arc::new(InteractionService::new(tweets, users, max_toggle_attempts)),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
