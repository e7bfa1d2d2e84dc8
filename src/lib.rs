//! # MedCare Backend
//!
//! Healthcare information backend exposing the account layer of the MedCare
//! mobile application. The service owns registration, login gating, and
//! one-time-passcode (OTP) verification over email or SMS.
//!
//! ## Account model
//!
//! Every account is keyed by exactly one contact identifier, either an email
//! address or a phone number. The identifier doubles as the login key and as
//! the OTP delivery address.
//!
//! - **Registration** creates an unverified account, mints a 4-digit OTP
//!   valid for 60 seconds, and dispatches it over the matching channel.
//! - **Login** never succeeds while the account is unverified: a correct
//!   password against an unverified account re-issues a fresh OTP and
//!   returns 401 with a `requireOtp` marker.
//! - **Verification** is monotonic; once an account is verified nothing in
//!   this service reverts it.
//!
//! At most one live OTP challenge exists per account. Issuing a new one
//! unconditionally replaces the previous one.
//!
//! ## Delivery
//!
//! OTP delivery is best-effort: account writes commit before dispatch, and a
//! failed send is logged without failing the enclosing request.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
