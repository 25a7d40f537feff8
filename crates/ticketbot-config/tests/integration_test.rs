//! Integration tests for ticketbot-config crate.

use proptest::prelude::*;
use std::collections::HashMap;
use ticketbot_common::TicketBotError;
use ticketbot_config::{ConfigLoader, ConfigValidator, CLIENT_ID_VAR, TOKEN_VAR};

fn loader_from(vars: HashMap<String, String>) -> ConfigLoader {
    ConfigLoader::new(move |key| vars.get(key).cloned())
}

#[test]
fn test_missing_credentials_surface_through_validation_not_loading() {
    let config = loader_from(HashMap::new()).load().expect("loading never requires credentials");
    let err = ConfigValidator::validate(&config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required environment variables: DISCORD_TOKEN, CLIENT_ID"
    );
}

proptest! {
    #[test]
    fn test_diagnostic_enumerates_exactly_the_missing_variables(
        has_token in any::<bool>(),
        has_client in any::<bool>(),
    ) {
        let mut vars = HashMap::new();
        if has_token {
            vars.insert(TOKEN_VAR.to_string(), "token.value".to_string());
        }
        if has_client {
            vars.insert(CLIENT_ID_VAR.to_string(), "1234".to_string());
        }

        let config = loader_from(vars).load().unwrap();
        let result = ConfigValidator::validate(&config);

        let mut expected = Vec::new();
        if !has_token {
            expected.push(TOKEN_VAR.to_string());
        }
        if !has_client {
            expected.push(CLIENT_ID_VAR.to_string());
        }

        match result {
            Ok(_) => prop_assert!(expected.is_empty()),
            Err(TicketBotError::MissingConfig(names)) => prop_assert_eq!(names, expected),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[test]
fn test_missing_credentials_are_reported_before_malformed_optionals() {
    let vars = HashMap::from([("GUILD_ID".to_string(), "abc".to_string())]);
    let err = ConfigValidator::load_validated(&loader_from(vars)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required environment variables: DISCORD_TOKEN, CLIENT_ID"
    );
}

#[test]
fn test_malformed_optional_is_reported_once_credentials_are_present() {
    let vars = HashMap::from([
        (TOKEN_VAR.to_string(), "token.value".to_string()),
        (CLIENT_ID_VAR.to_string(), "1234".to_string()),
        ("GUILD_ID".to_string(), "abc".to_string()),
    ]);
    let err = ConfigValidator::load_validated(&loader_from(vars)).unwrap_err();
    assert!(matches!(err, TicketBotError::InvalidConfig { ref variable, .. } if variable == "GUILD_ID"));
}
