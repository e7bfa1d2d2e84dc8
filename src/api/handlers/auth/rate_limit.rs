//! Rate limiting seam for the auth flows.
//!
//! No limits are enforced today; resend and login-triggered re-issue are
//! unthrottled. The trait keeps the seam in place for a cooldown
//! implementation without touching the handlers.

#[derive(Clone, Copy, Debug)]
pub enum RateLimitAction {
    Register,
    Login,
    VerifyOtp,
    ResendOtp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_identifier(&self, identifier: &str, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_identifier(&self, _identifier: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}
