//! Shared auth state injected into the flow handlers.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::notify::OtpSender;
use super::otp::{Clock, SystemClock};
use super::rate_limit::{NoopRateLimiter, RateLimiter};
use super::session::SessionIssuer;
use super::types::Identifier;

/// Constructed once at startup and passed through an axum `Extension`.
/// Every collaborator is swappable, which is what the handler tests use.
#[derive(Clone)]
pub struct AuthState {
    clock: Arc<dyn Clock>,
    email_sender: Arc<dyn OtpSender>,
    sms_sender: Arc<dyn OtpSender>,
    sessions: SessionIssuer,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        sessions: SessionIssuer,
        email_sender: Arc<dyn OtpSender>,
        sms_sender: Arc<dyn OtpSender>,
    ) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            email_sender,
            sms_sender,
            sessions,
            rate_limiter: Arc::new(NoopRateLimiter),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    /// Pick the delivery channel matching the account's identifier kind.
    #[must_use]
    pub fn sender_for(&self, identifier: &Identifier) -> &Arc<dyn OtpSender> {
        match identifier {
            Identifier::Email(_) => &self.email_sender,
            Identifier::Phone(_) => &self.sms_sender,
        }
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<dyn RateLimiter> {
        &self.rate_limiter
    }
}
