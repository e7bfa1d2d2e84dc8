use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .map(|s| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --jwt-secret"))?;

    let mut globals = GlobalArgs::new(jwt_secret);

    if let Some(ttl) = matches.get_one::<i64>("session-ttl-hours") {
        globals.session_ttl_hours = *ttl;
    }

    if let Some(from) = matches.get_one::<String>("email-from") {
        globals.email_from = from.to_string();
    }

    if let Some(key) = matches.get_one::<String>("sendgrid-api-key") {
        globals.sendgrid_api_key = SecretString::from(key.to_string());
    }

    if let Some(sid) = matches.get_one::<String>("twilio-account-sid") {
        globals.twilio_account_sid = sid.to_string();
    }

    if let Some(token) = matches.get_one::<String>("twilio-auth-token") {
        globals.twilio_auth_token = SecretString::from(token.to_string());
    }

    if let Some(from) = matches.get_one::<String>("twilio-from") {
        globals.twilio_from = from.to_string();
    }

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_defaults() {
        let matches = commands::new().get_matches_from(vec![
            "medcare",
            "--dsn",
            "postgres://localhost/medcare",
            "--jwt-secret",
            "sekret",
        ]);

        let (action, globals) = handler(&matches).unwrap();
        let Action::Server { port, dsn } = action;
        assert_eq!(port, 8080);
        assert_eq!(dsn, "postgres://localhost/medcare");
        assert_eq!(globals.jwt_secret.expose_secret(), "sekret");
        assert_eq!(globals.session_ttl_hours, 24);
        assert_eq!(globals.email_from, "no-reply@medcare.app");
        assert!(globals.twilio_account_sid.is_empty());
    }

    #[test]
    fn test_handler_twilio_args() {
        let matches = commands::new().get_matches_from(vec![
            "medcare",
            "--dsn",
            "postgres://localhost/medcare",
            "--jwt-secret",
            "sekret",
            "--twilio-account-sid",
            "AC000",
            "--twilio-auth-token",
            "token",
            "--twilio-from",
            "+15005550006",
        ]);

        let (_action, globals) = handler(&matches).unwrap();
        assert_eq!(globals.twilio_account_sid, "AC000");
        assert_eq!(globals.twilio_auth_token.expose_secret(), "token");
        assert_eq!(globals.twilio_from, "+15005550006");
    }
}
