use secrecy::SecretString;

/// Secrets and delivery credentials shared across actions.
///
/// Empty provider credentials mean "not configured"; the server then falls
/// back to log-only OTP delivery for that channel.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub session_ttl_hours: i64,
    pub email_from: String,
    pub sendgrid_api_key: SecretString,
    pub twilio_account_sid: String,
    pub twilio_auth_token: SecretString,
    pub twilio_from: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            session_ttl_hours: 24,
            email_from: String::new(),
            sendgrid_api_key: SecretString::default(),
            twilio_account_sid: String::new(),
            twilio_auth_token: SecretString::default(),
            twilio_from: String::new(),
        }
    }
}
