//! Client-side alerting for keyword tweets.
//!
//! The permission state lives in an [`AlertContext`] value owned by the UI layer
//! instead of in platform globals, so each of the three states can be injected
//! directly. `Granted` and `Denied` are terminal for the lifetime of a context:
//! once denied, the platform must not be prompted again.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub const ALERT_TITLE: &str = "New Tweet Alert";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unrequested,
    Granted,
    Denied,
}

/// The platform's answer to a permission prompt. A dismissed prompt is `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformDecision {
    Granted,
    Denied,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlertError {
    #[error("this platform does not support desktop notifications")]
    Unsupported,
}

/// The host's notification facility (browser, desktop shell, test fake).
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    fn supports_notifications(&self) -> bool;

    /// Shows the permission prompt and waits for the user's answer.
    async fn prompt(&self) -> PlatformDecision;

    /// Displays a transient system-level alert.
    fn show(&self, title: &str, body: &str);
}

pub struct AlertContext<P> {
    platform: P,
    state: PermissionState,
}

impl<P: NotificationPlatform> AlertContext<P> {
    pub fn new(platform: P) -> Self {
        Self::with_state(platform, PermissionState::Unrequested)
    }

    pub fn with_state(platform: P, state: PermissionState) -> Self {
        Self { platform, state }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// User-initiated permission request.
    ///
    /// Fails fast with [`AlertError::Unsupported`] when the platform has no
    /// notification capability. Only `Unrequested` prompts.
    pub async fn request_permission(&mut self) -> Result<PermissionState, AlertError> {
        if !self.platform.supports_notifications() {
            return Err(AlertError::Unsupported);
        }
        if self.state == PermissionState::Unrequested {
            self.state = match self.platform.prompt().await {
                PlatformDecision::Granted => PermissionState::Granted,
                PlatformDecision::Denied => PermissionState::Denied,
            };
            debug!(state = ?self.state, "notification permission resolved");
        }
        Ok(self.state)
    }

    /// Shows `content` as an alert. Returns whether anything was displayed.
    pub fn show_tweet_alert(&self, content: &str) -> bool {
        if self.state != PermissionState::Granted || !self.platform.supports_notifications() {
            return false;
        }
        self.platform.show(ALERT_TITLE, content);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakePlatform {
        supported: bool,
        answer: PlatformDecision,
        prompts: AtomicUsize,
        shown: Mutex<Vec<(String, String)>>,
    }

    impl FakePlatform {
        fn new(supported: bool, answer: PlatformDecision) -> Self {
            Self {
                supported,
                answer,
                prompts: AtomicUsize::new(0),
                shown: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }

        fn shown(&self) -> Vec<(String, String)> {
            self.shown.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationPlatform for FakePlatform {
        fn supports_notifications(&self) -> bool {
            self.supported
        }

        async fn prompt(&self) -> PlatformDecision {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.answer
        }

        fn show(&self, title: &str, body: &str) {
            self.shown.lock().unwrap().push((title.to_string(), body.to_string()));
        }
    }

    #[tokio::test]
    async fn grant_then_alert() {
        let mut ctx = AlertContext::new(FakePlatform::new(true, PlatformDecision::Granted));
        assert_eq!(ctx.state(), PermissionState::Unrequested);
        assert!(!ctx.show_tweet_alert("too early"));

        assert_eq!(ctx.request_permission().await, Ok(PermissionState::Granted));
        assert!(ctx.show_tweet_alert("science news"));
        assert_eq!(ctx.platform().shown(), vec![(ALERT_TITLE.to_string(), "science news".to_string())]);
    }

    #[tokio::test]
    async fn denied_is_terminal_and_never_reprompts() {
        let mut ctx = AlertContext::new(FakePlatform::new(true, PlatformDecision::Denied));
        assert_eq!(ctx.request_permission().await, Ok(PermissionState::Denied));
        assert_eq!(ctx.request_permission().await, Ok(PermissionState::Denied));
        assert_eq!(ctx.platform().prompts(), 1);
        assert!(!ctx.show_tweet_alert("cricket"));
        assert!(ctx.platform().shown().is_empty());
    }

    #[tokio::test]
    async fn granted_does_not_reprompt() {
        let mut ctx = AlertContext::with_state(
            FakePlatform::new(true, PlatformDecision::Denied),
            PermissionState::Granted,
        );
        assert_eq!(ctx.request_permission().await, Ok(PermissionState::Granted));
        assert_eq!(ctx.platform().prompts(), 0);
    }

    #[tokio::test]
    async fn unsupported_platform_fails_fast() {
        let mut ctx = AlertContext::new(FakePlatform::new(false, PlatformDecision::Granted));
        assert_eq!(ctx.request_permission().await, Err(AlertError::Unsupported));
        assert_eq!(ctx.platform().prompts(), 0);
        assert_eq!(ctx.state(), PermissionState::Unrequested);
    }

    #[test]
    fn alert_is_noop_on_unsupported_platform_even_if_granted() {
        let ctx = AlertContext::with_state(
            FakePlatform::new(false, PlatformDecision::Granted),
            PermissionState::Granted,
        );
        assert!(!ctx.show_tweet_alert("science"));
        assert!(ctx.platform().shown().is_empty());
    }
}
