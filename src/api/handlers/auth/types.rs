//! Request/response types for the auth endpoints, plus the contact
//! identifier union carried through the whole flow.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The contact channel an account is keyed on. Exactly one of email or phone
/// per account; the same value is the login key and the OTP destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    Email(String),
    Phone(String),
}

impl Identifier {
    /// Wire name of the channel, matches the `type` request field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Email(value) | Self::Phone(value) => value,
        }
    }

    /// Build from an explicit `type` discriminator (register/login payloads).
    #[must_use]
    pub fn from_typed(kind: &str, email: Option<&str>, phone: Option<&str>) -> Option<Self> {
        match kind {
            "email" => email.map(|value| Self::Email(value.to_string())),
            "phone" => phone.map(|value| Self::Phone(value.to_string())),
            _ => None,
        }
    }

    /// Build from whichever field is present (verify/resend payloads).
    /// Email wins when both are supplied, matching the original contract.
    #[must_use]
    pub fn from_either(email: Option<&str>, phone: Option<&str>) -> Option<Self> {
        if let Some(email) = email {
            return Some(Self::Email(email.to_string()));
        }
        phone.map(|value| Self::Phone(value.to_string()))
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub password: Option<String>,
    /// Accepts `1`/`0` or `"1"`/`"0"`; only an explicit zero blocks signup.
    #[serde(rename = "isNotify", default)]
    #[schema(value_type = Object)]
    pub is_notify: Option<serde_json::Value>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
    pub token: String,
}

/// 401 body returned when a correct password hits an unverified account.
/// Carries enough for the client to route to the verify screen; the
/// identifier is masked.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RequireOtpResponse {
    pub message: String,
    #[serde(rename = "requireOtp")]
    pub require_otp: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub otp: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn identifier_from_typed_selects_channel() {
        let id = Identifier::from_typed("email", Some("a@x.com"), Some("+15551234567")).unwrap();
        assert_eq!(id, Identifier::Email("a@x.com".to_string()));
        assert_eq!(id.kind(), "email");

        let id = Identifier::from_typed("phone", None, Some("+15551234567")).unwrap();
        assert_eq!(id.value(), "+15551234567");
        assert_eq!(id.kind(), "phone");

        assert!(Identifier::from_typed("email", None, Some("+15551234567")).is_none());
        assert!(Identifier::from_typed("carrier-pigeon", Some("a@x.com"), None).is_none());
    }

    #[test]
    fn identifier_from_either_prefers_email() {
        let id = Identifier::from_either(Some("a@x.com"), Some("+15551234567")).unwrap();
        assert_eq!(id.kind(), "email");
        let id = Identifier::from_either(None, Some("+15551234567")).unwrap();
        assert_eq!(id.kind(), "phone");
        assert!(Identifier::from_either(None, None).is_none());
    }

    #[test]
    fn register_request_accepts_numeric_and_string_is_notify() -> Result<()> {
        let request: RegisterRequest = serde_json::from_value(json!({
            "type": "email",
            "name": "Alice",
            "email": "a@x.com",
            "password": "secret",
            "isNotify": 1
        }))?;
        assert_eq!(request.kind.as_deref(), Some("email"));
        assert_eq!(request.is_notify, Some(json!(1)));

        let request: RegisterRequest = serde_json::from_value(json!({
            "type": "phone",
            "name": "Bob",
            "phone": "+15551234567",
            "password": "secret",
            "isNotify": "0"
        }))?;
        assert_eq!(request.is_notify, Some(json!("0")));
        Ok(())
    }

    #[test]
    fn require_otp_response_round_trips() -> Result<()> {
        let response = RequireOtpResponse {
            message: "verify first".to_string(),
            require_otp: true,
            email: Some("a***e@x.com".to_string()),
            phone: None,
            user_id: "42".to_string(),
        };
        let value = serde_json::to_value(&response)?;
        assert_eq!(value.get("requireOtp"), Some(&json!(true)));
        assert_eq!(value.get("userId"), Some(&json!("42")));
        let decoded: RequireOtpResponse = serde_json::from_value(value)?;
        assert!(decoded.require_otp);
        Ok(())
    }
}
