//! Server-side keyword detection for newly posted tweets.

use async_trait::async_trait;
use domains::{DetectionEvent, DetectionSink, Tweet, User};
use tracing::info;

pub const DEFAULT_KEYWORDS: [&str; 2] = ["cricket", "science"];

/// Case-insensitive substring matcher over a configured keyword set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordDetector {
    /// Lower-cased, trimmed, de-duplicated, in configuration order
    keywords: Vec<String>,
}

impl KeywordDetector {
    /// Blank entries are dropped. An empty set never matches.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        Self { keywords: normalized }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Emits an event iff the author opted in and the content mentions a keyword.
    pub fn evaluate(&self, tweet: &Tweet, author: &User) -> Option<DetectionEvent> {
        if !author.notifications_enabled {
            return None;
        }
        let content = tweet.content.to_lowercase();
        let keyword = self.keywords.iter().find(|k| content.contains(k.as_str()))?;
        Some(DetectionEvent {
            author_id: author.id,
            tweet_id: tweet.id,
            content: tweet.content.clone(),
            keyword: keyword.clone(),
        })
    }
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

/// Records detections in the structured log. Real delivery plugs in behind the same port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDetectionSink;

#[async_trait]
impl DetectionSink for TracingDetectionSink {
    async fn publish(&self, event: DetectionEvent) -> anyhow::Result<()> {
        info!(
            author_id = %event.author_id,
            tweet_id = %event.tweet_id,
            keyword = %event.keyword,
            content = %event.content,
            "keyword tweet detected"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::NewTweet;
    use uuid::Uuid;

    fn author(enabled: bool) -> User {
        User {
            id: Uuid::now_v7(),
            username: "cleo".into(),
            display_name: "Cleo".into(),
            email: "cleo@example.com".into(),
            avatar: None,
            notifications_enabled: enabled,
        }
    }

    fn tweet_by(author: &User, content: &str) -> Tweet {
        Tweet::new(
            NewTweet {
                author_id: author.id,
                content: content.into(),
                image: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn matches_case_insensitively_when_enabled() {
        let detector = KeywordDetector::default();
        let cleo = author(true);
        let tweet = tweet_by(&cleo, "Great Cricket match today");

        let event = detector.evaluate(&tweet, &cleo).expect("should trigger");
        assert_eq!(event.author_id, cleo.id);
        assert_eq!(event.tweet_id, tweet.id);
        assert_eq!(event.content, "Great Cricket match today");
        assert_eq!(event.keyword, "cricket");
    }

    #[test]
    fn silent_when_author_opted_out() {
        let detector = KeywordDetector::default();
        let cleo = author(false);
        assert!(detector.evaluate(&tweet_by(&cleo, "Great Cricket match today"), &cleo).is_none());
    }

    #[test]
    fn silent_without_keyword() {
        let detector = KeywordDetector::default();
        let cleo = author(true);
        assert!(detector.evaluate(&tweet_by(&cleo, "football tonight"), &cleo).is_none());
    }

    #[test]
    fn keywords_are_normalized() {
        let detector = KeywordDetector::new(["  Rust ", "", "rust", "SCIENCE"]);
        assert_eq!(detector.keywords(), ["rust", "science"]);

        let cleo = author(true);
        let event = detector.evaluate(&tweet_by(&cleo, "Computer sCiEnCe rocks"), &cleo).unwrap();
        assert_eq!(event.keyword, "science");
    }

    #[test]
    fn empty_keyword_set_never_matches() {
        let detector = KeywordDetector::new(Vec::<String>::new());
        let cleo = author(true);
        assert!(detector.evaluate(&tweet_by(&cleo, "cricket science"), &cleo).is_none());
    }

    #[test]
    fn tracing_sink_accepts_events() {
        let cleo = author(true);
        let tweet = tweet_by(&cleo, "science news");
        let event = KeywordDetector::default().evaluate(&tweet, &cleo).unwrap();
        tokio_test::block_on(TracingDetectionSink.publish(event)).unwrap();
    }
}
