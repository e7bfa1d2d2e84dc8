//! Registration: create an unverified account and dispatch its first OTP.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, instrument};

use super::message;
use super::notify::{build_message, OtpPurpose};
use super::otp;
use super::password::hash_password;
use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{insert_user, NewUser, RegisterOutcome};
use super::types::{Identifier, MessageResponse, RegisterRequest, RegisterResponse};
use super::utils::{normalize_identifier, notifications_disabled, valid_identifier};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, OTP dispatched", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields", body = MessageResponse),
        (status = 403, description = "Notifications disabled", body = MessageResponse),
        (status = 409, description = "Identifier already registered", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(pool, state, payload))]
pub async fn register(
    pool: Extension<PgPool>,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return message(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let (Some(kind), Some(name), Some(password)) =
        (request.kind.as_deref(), request.name.as_deref(), request.password.as_deref())
    else {
        return message(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    // The mobile flow hard-requires notification opt-in; reject before any
    // other work so a blocked signup leaves no trace.
    if notifications_disabled(request.is_notify.as_ref()) {
        return message(
            StatusCode::FORBIDDEN,
            "Notifications are disabled. Please enable notifications to register.",
        );
    }

    let Some(identifier) =
        Identifier::from_typed(kind, request.email.as_deref(), request.phone.as_deref())
    else {
        return message(StatusCode::BAD_REQUEST, "Missing required fields");
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
        .check_identifier(identifier.value(), RateLimitAction::Register)
        == RateLimitDecision::Limited
    {
        return message(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    }

    let password_hash = match hash_password(password) {
        Ok(digest) => digest,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    let challenge = otp::issue(state.now());

    let new_user = NewUser {
        name,
        identifier: &identifier,
        gender: request.gender.as_deref(),
        dob: request.dob.as_deref(),
        password_hash: &password_hash,
        notify: true,
        challenge: &challenge,
    };

    let user_id = match insert_user(&pool, &new_user).await {
        Ok(RegisterOutcome::Created(id)) => id,
        Ok(RegisterOutcome::Conflict) => {
            return message(
                StatusCode::CONFLICT,
                &format!("{} already exists", identifier.kind()),
            );
        }
        Err(err) => {
            error!("Failed to insert user: {err}");
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
        }
    };

    // Best-effort delivery: the account row is committed, a failed send is
    // logged and the caller still gets 201.
    let notification = build_message(&identifier, OtpPurpose::Registration, name, &challenge.code);
    if let Err(err) = state.sender_for(&identifier).send(&notification).await {
        error!("Failed to dispatch registration OTP: {err}");
    }

    let response = RegisterResponse {
        message: format!(
            "User registered successfully. OTP sent to {}.",
            identifier.kind()
        ),
        user_id: user_id.to_string(),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{lazy_pool, test_state};
    use super::*;
    use anyhow::Result;
    use axum::response::IntoResponse;
    use serde_json::json;

    fn request(value: serde_json::Value) -> Option<Json<RegisterRequest>> {
        Some(Json(serde_json::from_value(value).unwrap()))
    }

    #[tokio::test]
    async fn missing_payload_is_bad_request() -> Result<()> {
        let response = register(Extension(lazy_pool()?), Extension(test_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn missing_required_fields_is_bad_request() -> Result<()> {
        let response = register(
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
    async fn notifications_opt_out_is_forbidden() -> Result<()> {
        for is_notify in [json!(0), json!("0")] {
            let response = register(
                Extension(lazy_pool()?),
                Extension(test_state()),
                request(json!({
                    "type": "email",
                    "name": "Alice",
                    "email": "a@x.com",
                    "password": "secret",
                    "isNotify": is_notify
                })),
            )
            .await
            .into_response();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
        Ok(())
    }

    #[tokio::test]
    async fn identifier_missing_for_type_is_bad_request() -> Result<()> {
        // type says phone but only an email was supplied
        let response = register(
            Extension(lazy_pool()?),
            Extension(test_state()),
            request(json!({
                "type": "phone",
                "name": "Alice",
                "email": "a@x.com",
                "password": "secret",
                "isNotify": 1
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_phone_is_rejected_not_rerouted() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(test_state()),
            request(json!({
                "type": "phone",
                "name": "Alice",
                "phone": "9727515301",
                "password": "secret",
                "isNotify": 1
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
