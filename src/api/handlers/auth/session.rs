//! Stateless session tokens for verified accounts.
//!
//! Tokens are HMAC-signed JWTs carrying the account id, display name, and
//! contact identifier. Expiry is the only lifecycle bound; there is no
//! revocation list.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub name: String,
    pub identifier: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_hours: i64,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, issuer: String, ttl_hours: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            ttl_hours,
        }
    }

    /// Sign a session token for a verified account.
    pub fn issue(
        &self,
        user_id: Uuid,
        name: &str,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let exp = now + Duration::hours(self.ttl_hours);

        let claims = SessionClaims {
            sub: user_id.to_string(),
            user_id,
            name: name.to_string(),
            identifier: identifier.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a session token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
