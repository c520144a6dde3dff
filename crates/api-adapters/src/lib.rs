//! # api-adapters
//!
//! The HTTP surface of rusty-feed. Wire types and metrics are always compiled;
//! the axum router sits behind the `web-axum` feature.

pub mod dto;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use state::AppState;

/// Builds the application router.
///
/// Paths follow the public API the web client already calls; `{id}` is a tweet id.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(handlers::root))
        .route("/api/tweet", post(handlers::create_tweet).get(handlers::list_tweets))
        .route("/api/tweets/user/{user_id}", get(handlers::list_user_tweets))
        .route("/api/tweet/like/{id}", post(handlers::like_tweet))
        .route("/api/tweet/retweet/{id}", post(handlers::retweet_tweet))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::trace_layer())
        .layer(middleware::cors_policy())
        .with_state(state)
}
