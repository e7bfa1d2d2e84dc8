//! OTP verification and resend endpoints.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, instrument};

use super::message;
use super::notify::{build_message, OtpPurpose};
use super::otp::{self, OtpOutcome};
use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{lookup_user, mark_verified, update_challenge};
use super::types::{Identifier, MessageResponse, ResendOtpRequest, VerifyOtpRequest};
use super::utils::normalize_identifier;

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified, account activated", body = MessageResponse),
        (status = 400, description = "Missing fields, expired OTP, or invalid OTP", body = MessageResponse),
        (status = 404, description = "No account for the identifier", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(pool, state, payload))]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return message(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let (Some(submitted), Some(identifier)) = (
        request.otp.as_deref(),
        Identifier::from_either(request.email.as_deref(), request.phone.as_deref()),
    ) else {
        return message(StatusCode::BAD_REQUEST, "Phone or Email and OTP are required");
    };

    let identifier = normalize_identifier(identifier);

    if state
        .rate_limiter()
        .check_identifier(identifier.value(), RateLimitAction::VerifyOtp)
        == RateLimitDecision::Limited
    {
        return message(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    }

    let user = match lookup_user(&pool, &identifier).await {
        Ok(Some(user)) => user,
        Ok(None) => return message(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => {
            error!("Failed to lookup user: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    // An account always carries a challenge from registration onward; a bare
    // row can only mean the code on file is unusable.
    let Some(challenge) = user.challenge else {
        return message(StatusCode::BAD_REQUEST, "Invalid OTP");
    };

    match otp::validate(submitted, &challenge, state.now()) {
        OtpOutcome::Expired => message(StatusCode::BAD_REQUEST, "OTP expired"),
        OtpOutcome::Mismatch => message(StatusCode::BAD_REQUEST, "Invalid OTP"),
        OtpOutcome::Success => {
            if let Err(err) = mark_verified(&pool, user.id).await {
                error!("Failed to mark user verified: {err}");
                return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
            }
            message(StatusCode::OK, "OTP verified successfully")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Fresh OTP dispatched", body = MessageResponse),
        (status = 400, description = "Missing identifier or already verified", body = MessageResponse),
        (status = 404, description = "No account for the identifier", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(pool, state, payload))]
pub async fn resend_otp(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> impl IntoResponse {
    let request: ResendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return message(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let Some(identifier) =
        Identifier::from_either(request.email.as_deref(), request.phone.as_deref())
    else {
        return message(
            StatusCode::BAD_REQUEST,
            "Email or Phone is required to resend OTP",
        );
    };

    let identifier = normalize_identifier(identifier);

    if state
        .rate_limiter()
        .check_identifier(identifier.value(), RateLimitAction::ResendOtp)
        == RateLimitDecision::Limited
    {
        return message(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    }

    let user = match lookup_user(&pool, &identifier).await {
        Ok(Some(user)) => user,
        Ok(None) => return message(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => {
            error!("Failed to lookup user: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    // Resend is only meaningful pre-verification; bail before touching the
    // stored challenge.
    if user.verified {
        return message(StatusCode::BAD_REQUEST, "User is already verified");
    }

    let challenge = otp::issue(state.now());
    if let Err(err) = update_challenge(&pool, user.id, &challenge).await {
        error!("Failed to store resent challenge: {err}");
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }

    let notification = build_message(&identifier, OtpPurpose::Resend, &user.name, &challenge.code);
    if let Err(err) = state.sender_for(&identifier).send(&notification).await {
        error!("Failed to dispatch resent OTP: {err}");
    }

    message(StatusCode::OK, "New OTP sent successfully")
}
