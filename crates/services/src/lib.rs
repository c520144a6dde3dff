//! # services
//!
//! Application logic for rusty-feed, written against the ports in `domains`.
//!
//! - [`interaction`]: like/retweet toggles with optimistic concurrency
//! - [`feed`]: author-resolved, reverse-chronological feeds
//! - [`posting`]: tweet creation plus keyword detection
//! - [`notification`]: the server-side keyword detector and the logging sink
//! - [`alerts`]: the client-side notification permission state machine

pub mod alerts;
pub mod feed;
pub mod interaction;
pub mod notification;
pub mod posting;

pub use alerts::{AlertContext, AlertError, NotificationPlatform, PermissionState, PlatformDecision};
pub use feed::FeedService;
pub use interaction::{InteractionService, Toggled, DEFAULT_MAX_TOGGLE_ATTEMPTS};
pub use notification::{KeywordDetector, TracingDetectionSink, DEFAULT_KEYWORDS};
pub use posting::{Posted, PostingService};
