//! OTP challenge minting and validation.
//!
//! A challenge is a 4-digit code with a 60 second window. Issuing a new
//! challenge always replaces the previous one; there is never more than one
//! live code per account. Validation has no side effects, persisting the
//! outcome is the caller's job.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};

/// Fixed challenge window. The mobile client counts down from this value.
pub const OTP_TTL_SECONDS: i64 = 60;

const OTP_MIN: u32 = 1000;
const OTP_MAX: u32 = 9999;

/// Wall clock abstraction so expiry can be tested deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The single live OTP attempt embedded in a user row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Validation result. Expiry is checked before the code, so a correct code
/// submitted after the window still reads `Expired`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpOutcome {
    Success,
    Expired,
    Mismatch,
}

/// Mint a new challenge: uniform 4-digit code, `now + 60s` expiry.
#[must_use]
pub fn issue(now: DateTime<Utc>) -> Challenge {
    let code = OsRng.gen_range(OTP_MIN..=OTP_MAX);

    Challenge {
        code: code.to_string(),
        expires_at: now + Duration::seconds(OTP_TTL_SECONDS),
    }
}

/// Compare a submitted code against the stored challenge.
#[must_use]
pub fn validate(submitted: &str, challenge: &Challenge, now: DateTime<Utc>) -> OtpOutcome {
    if now > challenge.expires_at {
        return OtpOutcome::Expired;
    }

    if submitted == challenge.code {
        OtpOutcome::Success
    } else {
        OtpOutcome::Mismatch
    }
}
