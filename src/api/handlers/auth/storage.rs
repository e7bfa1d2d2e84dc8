//! Database access for user accounts and challenge state.
//!
//! All mutations are single-row; lookups resolve the identifier once and
//! every later write is keyed by the primary id. A read-then-write sequence
//! (check unverified, overwrite challenge) is intentionally not wrapped in a
//! transaction: the last challenge write wins.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::otp::Challenge;
use super::types::Identifier;
use super::utils::is_unique_violation;

/// A user row, with the embedded challenge when one has been issued.
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) email: Option<String>,
    pub(super) phone: Option<String>,
    pub(super) password_hash: String,
    pub(super) challenge: Option<Challenge>,
    pub(super) verified: bool,
}

/// Everything needed to create an unverified account with its first challenge.
pub(super) struct NewUser<'a> {
    pub(super) name: &'a str,
    pub(super) identifier: &'a Identifier,
    pub(super) gender: Option<&'a str>,
    pub(super) dob: Option<&'a str>,
    pub(super) password_hash: &'a str,
    pub(super) notify: bool,
    pub(super) challenge: &'a Challenge,
}

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(super) enum RegisterOutcome {
    Created(Uuid),
    Conflict,
}

/// Look up an account by its contact identifier.
pub(super) async fn lookup_user(
    pool: &PgPool,
    identifier: &Identifier,
) -> Result<Option<UserRecord>> {
    let query = match identifier {
        Identifier::Email(_) => {
            "SELECT id, name, email, phone, password_hash, otp_code, otp_expires_at, is_verified \
             FROM tbl_user WHERE email = $1"
        }
        Identifier::Phone(_) => {
            "SELECT id, name, email, phone, password_hash, otp_code, otp_expires_at, is_verified \
             FROM tbl_user WHERE phone = $1"
        }
    };
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(identifier.value())
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;

    Ok(row.map(|row| {
        let otp_code: Option<String> = row.get("otp_code");
        let otp_expires_at: Option<DateTime<Utc>> = row.get("otp_expires_at");
        let challenge = match (otp_code, otp_expires_at) {
            (Some(code), Some(expires_at)) => Some(Challenge { code, expires_at }),
            _ => None,
        };

        UserRecord {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            password_hash: row.get("password_hash"),
            challenge,
            verified: row.get("is_verified"),
        }
    }))
}

/// Create an unverified account. A duplicate identifier maps to `Conflict`
/// via the unique constraint, which also covers concurrent registrations.
pub(super) async fn insert_user(pool: &PgPool, user: &NewUser<'_>) -> Result<RegisterOutcome> {
    let (email, phone) = match user.identifier {
        Identifier::Email(value) => (Some(value.as_str()), None),
        Identifier::Phone(value) => (None, Some(value.as_str())),
    };

    let query = r"
        INSERT INTO tbl_user
            (name, email, phone, gender, dob, password_hash, otp_code, otp_expires_at, is_verified, is_notify)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user.name)
        .bind(email)
        .bind(phone)
        .bind(user.gender)
        .bind(user.dob)
        .bind(user.password_hash)
        .bind(&user.challenge.code)
        .bind(user.challenge.expires_at)
        .bind(user.notify)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(RegisterOutcome::Created(row.get("id"))),
        Err(err) => {
            if is_unique_violation(&err) {
                return Ok(RegisterOutcome::Conflict);
            }
            Err(err).context("failed to insert user")
        }
    }
}

/// Replace the live challenge. Unconditional: the caller has already decided
/// the account is still unverified, and the last write wins.
pub(super) async fn update_challenge(
    pool: &PgPool,
    user_id: Uuid,
    challenge: &Challenge,
) -> Result<()> {
    let query = "UPDATE tbl_user SET otp_code = $2, otp_expires_at = $3 WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(&challenge.code)
        .bind(challenge.expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update challenge")?;

    Ok(())
}

/// Flip the account to verified. The stored challenge is left in place; it
/// becomes irrelevant once this commits.
pub(super) async fn mark_verified(pool: &PgPool, user_id: Uuid) -> Result<()> {
    let query = "UPDATE tbl_user SET is_verified = TRUE WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to mark user verified")?;

    Ok(())
}
