//! Validation, normalization, and masking helpers for the auth flow.

use regex::Regex;

use super::types::Identifier;

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Phone numbers must be E.164: leading `+`, 7 to 15 digits. Anything else
/// is rejected up front so an OTP can never be sent to a guessed number.
pub(super) fn valid_phone(phone: &str) -> bool {
    Regex::new(r"^\+[0-9]{7,15}$").is_ok_and(|regex| regex.is_match(phone))
}

/// Trim and lowercase where the channel calls for it.
pub(super) fn normalize_identifier(identifier: Identifier) -> Identifier {
    match identifier {
        Identifier::Email(value) => Identifier::Email(normalize_email(&value)),
        Identifier::Phone(value) => Identifier::Phone(value.trim().to_string()),
    }
}

pub(super) fn valid_identifier(identifier: &Identifier) -> bool {
    match identifier {
        Identifier::Email(value) => valid_email(value),
        Identifier::Phone(value) => valid_phone(value),
    }
}

/// Mask an email, keeping the first and last character of the local part.
pub(super) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            let first = chars.next();
            let last = if local.chars().count() > 1 {
                local.chars().last()
            } else {
                None
            };
            match (first, last) {
                (Some(first), Some(last)) => format!("{first}***{last}@{domain}"),
                (Some(first), None) => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            }
        }
        None => "***".to_string(),
    }
}

/// Mask a phone number, keeping the leading `+` and the last four digits.
pub(super) fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        return "+****".to_string();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    let stars = "*".repeat(digits.len() - 4);
    format!("+{stars}{tail}")
}

pub(super) fn mask_identifier(identifier: &Identifier) -> String {
    match identifier {
        Identifier::Email(value) => mask_email(value),
        Identifier::Phone(value) => mask_phone(value),
    }
}

/// The signup gate: only an explicit zero (number or string) blocks
/// registration, mirroring the mobile client's notification toggle.
pub(super) fn notifications_disabled(is_notify: Option<&serde_json::Value>) -> bool {
    match is_notify {
        Some(serde_json::Value::Number(number)) => number.as_i64() == Some(0),
        Some(serde_json::Value::String(text)) => text == "0",
        _ => false,
    }
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@example.com"));
    }

    #[test]
    fn valid_phone_requires_e164() {
        assert!(valid_phone("+15551234567"));
        assert!(valid_phone("+442071838750"));
        assert!(!valid_phone("15551234567"));
        assert!(!valid_phone("+1 555 123"));
        assert!(!valid_phone("+123"));
        assert!(!valid_phone(""));
    }

    #[test]
    fn mask_email_keeps_edges_of_local_part() {
        assert_eq!(mask_email("alice@x.com"), "a***e@x.com");
        assert_eq!(mask_email("ab@x.com"), "a***b@x.com");
        assert_eq!(mask_email("a@x.com"), "a***@x.com");
        assert_eq!(mask_email("nonsense"), "***");
    }

    #[test]
    fn mask_phone_keeps_last_four_digits() {
        assert_eq!(mask_phone("+15551234567"), "+*******4567");
        assert_eq!(mask_phone("+123"), "+****");
    }

    #[test]
    fn mask_identifier_follows_channel() {
        let email = Identifier::Email("alice@x.com".to_string());
        assert_eq!(mask_identifier(&email), "a***e@x.com");
        let phone = Identifier::Phone("+15551234567".to_string());
        assert_eq!(mask_identifier(&phone), "+*******4567");
    }

    #[test]
    fn normalize_identifier_per_channel() {
        let email = normalize_identifier(Identifier::Email(" A@X.COM ".to_string()));
        assert_eq!(email, Identifier::Email("a@x.com".to_string()));
        // Phones are trimmed but case/format is preserved for validation
        let phone = normalize_identifier(Identifier::Phone(" +15551234567 ".to_string()));
        assert_eq!(phone, Identifier::Phone("+15551234567".to_string()));
    }

    #[test]
    fn notifications_disabled_only_on_explicit_zero() {
        assert!(notifications_disabled(Some(&json!(0))));
        assert!(notifications_disabled(Some(&json!("0"))));
        assert!(!notifications_disabled(Some(&json!(1))));
        assert!(!notifications_disabled(Some(&json!("1"))));
        assert!(!notifications_disabled(Some(&json!(true))));
        assert!(!notifications_disabled(None));
    }
}
