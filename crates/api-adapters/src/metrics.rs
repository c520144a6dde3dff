//! Prometheus counters for the request surface, exposed at `GET /metrics`.

use domains::Interaction;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ToggleLabels {
    pub kind: String,
    /// `added` or `removed`
    pub result: String,
}

#[derive(Debug)]
pub struct Metrics {
    registry: Registry,
    tweets_posted: Counter,
    toggles: Family<ToggleLabels, Counter>,
    keyword_detections: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let tweets_posted = Counter::default();
        let toggles = Family::<ToggleLabels, Counter>::default();
        let keyword_detections = Counter::default();

        registry.register("tweets_posted", "Tweets successfully created", tweets_posted.clone());
        registry.register("toggles", "Applied like/retweet toggles", toggles.clone());
        registry.register(
            "keyword_detections",
            "Posts that matched a notification keyword",
            keyword_detections.clone(),
        );

        Self {
            registry,
            tweets_posted,
            toggles,
            keyword_detections,
        }
    }

    pub fn record_post(&self, detected: bool) {
        self.tweets_posted.inc();
        if detected {
            self.keyword_detections.inc();
        }
    }

    pub fn record_toggle(&self, kind: Interaction, member: bool) {
        let result = if member { "added" } else { "removed" };
        self.toggles
            .get_or_create(&ToggleLabels {
                kind: kind.as_str().to_string(),
                result: result.to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
