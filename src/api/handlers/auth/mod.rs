//! Account verification and login gating.
//!
//! Four operations drive the flow: register, login, verify-otp, resend-otp.
//! Accounts start unverified with a live OTP challenge; login is gated on
//! verification and re-issues a challenge when it blocks. Challenge writes
//! are single-row and unconditional, so concurrent re-issues race and the
//! last write wins.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};

pub mod login;
mod notify;
mod otp;
mod password;
mod rate_limit;
pub mod register;
mod session;
mod state;
mod storage;
pub mod types;
mod utils;
pub mod verify;

pub use login::login;
pub use notify::{LogOtpSender, OtpSender, SendgridEmailSender, TwilioSmsSender};
pub use register::register;
pub use session::SessionIssuer;
pub use state::AuthState;
pub use verify::{resend_otp, verify_otp};

/// Uniform `{ "message": ... }` body used by every non-2xx auth response
/// (and the plain 200s of verify/resend).
pub(crate) fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(types::MessageResponse {
            message: text.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod tests;
