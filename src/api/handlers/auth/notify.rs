//! OTP delivery over email and SMS.
//!
//! The flow handlers build the message and pick a sender by identifier kind;
//! senders are channel-agnostic beyond their transport. Delivery is
//! best-effort: the account write has already committed when a sender runs,
//! and a failure is logged without failing the request.
//!
//! The default sender for local dev is `LogOtpSender`, which logs and
//! returns `Ok(())`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;

use super::otp::OTP_TTL_SECONDS;
use super::types::Identifier;

/// A single OTP notification ready for dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Why the OTP is being sent; picks the wording of the message.
#[derive(Clone, Copy, Debug)]
pub enum OtpPurpose {
    Registration,
    Login,
    Resend,
}

/// Delivery abstraction over {email, SMS} transports.
#[async_trait]
pub trait OtpSender: Send + Sync {
    /// Deliver a message or return an error for the caller to log.
    async fn send(&self, message: &OtpMessage) -> Result<()>;
}

/// Local dev sender that logs the message instead of delivering it.
#[derive(Clone, Debug)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, message: &OtpMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "otp send stub"
        );
        Ok(())
    }
}

/// SMS delivery through the Twilio Messages API.
#[derive(Clone, Debug)]
pub struct TwilioSmsSender {
    account_sid: String,
    auth_token: SecretString,
    from: String,
    client: Client,
}

impl TwilioSmsSender {
    #[must_use]
    pub fn new(account_sid: String, auth_token: SecretString, from: String) -> Self {
        Self {
            account_sid,
            auth_token,
            from,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl OtpSender for TwilioSmsSender {
    async fn send(&self, message: &OtpMessage) -> Result<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{sid}/Messages.json",
            sid = self.account_sid
        );

        let form = [
            ("To", message.to.as_str()),
            ("From", self.from.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&form)
            .send()
            .await
            .context("request to Twilio failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("Twilio returned {status}: {detail}"));
        }

        Ok(())
    }
}

/// Email delivery through the SendGrid v3 mail API.
#[derive(Clone, Debug)]
pub struct SendgridEmailSender {
    api_key: SecretString,
    from: String,
    client: Client,
}

impl SendgridEmailSender {
    #[must_use]
    pub fn new(api_key: SecretString, from: String) -> Self {
        Self {
            api_key,
            from,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl OtpSender for SendgridEmailSender {
    async fn send(&self, message: &OtpMessage) -> Result<()> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.body }],
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .context("request to SendGrid failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("SendGrid returned {status}: {detail}"));
        }

        Ok(())
    }
}

/// Build the outbound notification for a freshly issued code.
#[must_use]
pub(super) fn build_message(
    identifier: &Identifier,
    purpose: OtpPurpose,
    name: &str,
    code: &str,
) -> OtpMessage {
    match identifier {
        Identifier::Email(email) => {
            let (subject, lead) = match purpose {
                OtpPurpose::Registration => (
                    "MedCare - Verify Your Email",
                    format!("<h2>Welcome, {name}!</h2><p>Your registration is almost complete.</p>"),
                ),
                OtpPurpose::Login => (
                    "MedCare - Verify Your Email to Login",
                    format!("<h2>Hello, {name}</h2><p>You must verify your email before logging in.</p>"),
                ),
                OtpPurpose::Resend => (
                    "MedCare - Resend OTP Verification",
                    format!("<h2>Hello, {name}</h2><p>Your new OTP for verification is:</p>"),
                ),
            };
            let body = format!(
                "{lead}<p><strong>OTP:</strong> {code}</p>\
                 <p>This OTP will expire in {OTP_TTL_SECONDS} seconds.</p>"
            );
            OtpMessage {
                to: email.clone(),
                subject: subject.to_string(),
                body,
            }
        }
        Identifier::Phone(phone) => OtpMessage {
            to: phone.clone(),
            subject: "MedCare OTP".to_string(),
            body: format!(
                "Your MedCare OTP is {code}. It will expire in {OTP_TTL_SECONDS} seconds."
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_message_carries_code_and_expiry() {
        let identifier = Identifier::Email("a@x.com".to_string());
        let message = build_message(&identifier, OtpPurpose::Registration, "Alice", "1234");
        assert_eq!(message.to, "a@x.com");
        assert_eq!(message.subject, "MedCare - Verify Your Email");
        assert!(message.body.contains("1234"));
        assert!(message.body.contains("60 seconds"));
        assert!(message.body.contains("Welcome, Alice!"));
    }

    #[test]
    fn login_and_resend_use_distinct_wording() {
        let identifier = Identifier::Email("a@x.com".to_string());
        let login = build_message(&identifier, OtpPurpose::Login, "Alice", "1234");
        let resend = build_message(&identifier, OtpPurpose::Resend, "Alice", "1234");
        assert_eq!(login.subject, "MedCare - Verify Your Email to Login");
        assert_eq!(resend.subject, "MedCare - Resend OTP Verification");
        assert_ne!(login.body, resend.body);
    }

    #[test]
    fn sms_message_is_plain_text() {
        let identifier = Identifier::Phone("+15551234567".to_string());
        let message = build_message(&identifier, OtpPurpose::Registration, "Bob", "4321");
        assert_eq!(message.to, "+15551234567");
        assert_eq!(
            message.body,
            "Your MedCare OTP is 4321. It will expire in 60 seconds."
        );
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let sender = LogOtpSender;
        let message = OtpMessage {
            to: "a@x.com".to_string(),
            subject: "subject".to_string(),
            body: "body".to_string(),
        };
        assert!(sender.send(&message).await.is_ok());
    }
}
