//! # Handlers
//!
//! Coordinates the flow between HTTP requests and the services. Input parsing
//! happens here; every rule about what is valid lives in `domains`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{parse_id, Interaction, NewTweet};
use tracing::error;

use crate::dto::{CreateTweetRequest, FeedItemResponse, ToggleRequest, TweetResponse};
use crate::error::ApiError;
use crate::state::AppState;

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn root() -> &'static str {
    "rusty-feed is live"
}

/// `POST /api/tweet`
pub async fn create_tweet(
    State(state): State<AppState>,
    body: Result<Json<CreateTweetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TweetResponse>), ApiError> {
    let Json(req) = body?;
    let draft = NewTweet::parse(req.author_id.as_deref(), req.content.as_deref(), req.image.as_deref())?;

    let posted = state.posting.create(draft).await?;
    state.metrics.record_post(posted.detection.is_some());

    Ok((StatusCode::CREATED, Json(TweetResponse::from(&posted.tweet))))
}

/// `GET /api/tweet`
pub async fn list_tweets(State(state): State<AppState>) -> Result<Json<Vec<FeedItemResponse>>, ApiError> {
    let feed = state.feed.list_all().await?;
    Ok(Json(feed.iter().map(FeedItemResponse::from).collect()))
}

/// `GET /api/tweets/user/{user_id}`
pub async fn list_user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FeedItemResponse>>, ApiError> {
    let user_id = parse_id("userId", Some(&user_id))?;
    let feed = state.feed.list_by_author(user_id).await?;
    Ok(Json(feed.iter().map(FeedItemResponse::from).collect()))
}

/// `POST /api/tweet/like/{id}`
pub async fn like_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<TweetResponse>, ApiError> {
    toggle(state, Interaction::Like, &tweet_id, body).await
}

/// `POST /api/tweet/retweet/{id}`
pub async fn retweet_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<TweetResponse>, ApiError> {
    toggle(state, Interaction::Retweet, &tweet_id, body).await
}

async fn toggle(
    state: AppState,
    kind: Interaction,
    tweet_id: &str,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<TweetResponse>, ApiError> {
    let Json(req) = body?;
    let tweet_id = parse_id("tweetId", Some(tweet_id))?;
    let user_id = parse_id("userId", req.user_id.as_deref())?;

    let toggled = state.interactions.toggle(kind, tweet_id, user_id).await?;
    state.metrics.record_toggle(kind, toggled.member);

    Ok(Json(TweetResponse::from(&toggled.tweet)))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Response {
    exposition(state.metrics.render())
}

fn exposition(rendered: Result<String, std::fmt::Error>) -> Response {
    match rendered {
        Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            error!(error = %err, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
