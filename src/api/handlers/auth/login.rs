//! Login with verification gating.
//!
//! A correct password is necessary but not sufficient: an unverified account
//! gets a fresh OTP and a 401 with `requireOtp`, never a session token.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, instrument};

use super::message;
use super::notify::{build_message, OtpPurpose};
use super::otp;
use super::password::verify_password;
use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{lookup_user, update_challenge};
use super::types::{
    Identifier, LoginRequest, LoginResponse, LoginUser, MessageResponse, RequireOtpResponse,
};
use super::utils::{mask_identifier, normalize_identifier, valid_identifier};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = MessageResponse),
        (status = 401, description = "Invalid password, or account not verified", body = RequireOtpResponse),
        (status = 404, description = "No account for the identifier", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(pool, state, payload))]
pub async fn login(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return message(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let (Some(kind), Some(password)) = (request.kind.as_deref(), request.password.as_deref())
    else {
        return message(StatusCode::BAD_REQUEST, "Missing credentials");
    };

    let Some(identifier) =
        Identifier::from_typed(kind, request.email.as_deref(), request.phone.as_deref())
    else {
        return message(StatusCode::BAD_REQUEST, "Missing credentials");
    };

    let identifier = normalize_identifier(identifier);
    if !valid_identifier(&identifier) {
        return match identifier {
            Identifier::Email(_) => message(StatusCode::BAD_REQUEST, "Invalid email"),
            Identifier::Phone(_) => message(StatusCode::BAD_REQUEST, "Invalid phone number"),
        };
    }

    if state
        .rate_limiter()
        .check_identifier(identifier.value(), RateLimitAction::Login)
        == RateLimitDecision::Limited
    {
        return message(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    }

    let user = match lookup_user(&pool, &identifier).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return message(
                StatusCode::NOT_FOUND,
                &format!("{} not found", identifier.kind()),
            );
        }
        Err(err) => {
            error!("Failed to lookup user: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    if !verify_password(password, &user.password_hash) {
        return message(StatusCode::UNAUTHORIZED, "Invalid password");
    }

    if !user.verified {
        // Replace whatever challenge was live and send a fresh code; login
        // is never granted pre-verification, even with a correct password.
        let challenge = otp::issue(state.now());
        if let Err(err) = update_challenge(&pool, user.id, &challenge).await {
            error!("Failed to store login challenge: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }

        let notification =
            build_message(&identifier, OtpPurpose::Login, &user.name, &challenge.code);
        if let Err(err) = state.sender_for(&identifier).send(&notification).await {
            error!("Failed to dispatch login OTP: {err}");
        }

        let kind = identifier.kind();
        let masked = mask_identifier(&identifier);
        let (email, phone) = match &identifier {
            Identifier::Email(_) => (Some(masked), None),
            Identifier::Phone(_) => (None, Some(masked)),
        };

        let response = RequireOtpResponse {
            message: format!(
                "Your {kind} is not verified. A new OTP has been sent. Please verify before logging in."
            ),
            require_otp: true,
            email,
            phone,
            user_id: user.id.to_string(),
        };

        return (StatusCode::UNAUTHORIZED, Json(response)).into_response();
    }

    let token = match state
        .sessions()
        .issue(user.id, &user.name, identifier.value(), state.now())
    {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to sign session token: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    let response = LoginResponse {
        message: "Login successful".to_string(),
        user: LoginUser {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
        },
        token,
    };

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{lazy_pool, test_state};
    use super::*;
    use anyhow::Result;
    use axum::response::IntoResponse;
    use serde_json::json;

    fn request(value: serde_json::Value) -> Option<Json<LoginRequest>> {
        Some(Json(serde_json::from_value(value).unwrap()))
    }

    #[tokio::test]
    async fn missing_payload_is_bad_request() -> Result<()> {
        let response = login(Extension(lazy_pool()?), Extension(test_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn missing_password_is_bad_request() -> Result<()> {
        let response = login(
            Extension(lazy_pool()?),
            Extension(test_state()),
            request(json!({ "type": "email", "email": "a@x.com" })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_type_is_bad_request() -> Result<()> {
        let response = login(
            Extension(lazy_pool()?),
            Extension(test_state()),
            request(json!({ "type": "fax", "email": "a@x.com", "password": "secret" })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_phone_is_bad_request() -> Result<()> {
        let response = login(
            Extension(lazy_pool()?),
            Extension(test_state()),
            request(json!({ "type": "phone", "phone": "12345", "password": "secret" })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
