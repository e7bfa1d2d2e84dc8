use crate::api::{
    self,
    handlers::auth::{
        AuthState, LogOtpSender, OtpSender, SendgridEmailSender, SessionIssuer, TwilioSmsSender,
    },
};
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            let email_sender: Arc<dyn OtpSender> =
                if globals.sendgrid_api_key.expose_secret().is_empty() {
                    info!("No SendGrid API key configured, OTP emails will be logged only");
                    Arc::new(LogOtpSender)
                } else {
                    Arc::new(SendgridEmailSender::new(
                        globals.sendgrid_api_key.clone(),
                        globals.email_from.clone(),
                    ))
                };

            let sms_sender: Arc<dyn OtpSender> = if globals.twilio_account_sid.is_empty() {
                info!("No Twilio credentials configured, OTP SMS will be logged only");
                Arc::new(LogOtpSender)
            } else {
                Arc::new(TwilioSmsSender::new(
                    globals.twilio_account_sid.clone(),
                    globals.twilio_auth_token.clone(),
                    globals.twilio_from.clone(),
                ))
            };

            let sessions = SessionIssuer::new(
                &globals.jwt_secret,
                env!("CARGO_PKG_NAME").to_string(),
                globals.session_ttl_hours,
            );

            let state = Arc::new(AuthState::new(sessions, email_sender, sms_sender));

            api::new(port, dsn, state).await?;
        }
    }

    Ok(())
}
