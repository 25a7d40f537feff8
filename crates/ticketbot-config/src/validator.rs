//! Validation of the required credentials.

use crate::loader::ConfigLoader;
use crate::schema::{Config, Credentials, CLIENT_ID_VAR, TOKEN_VAR};
use ticketbot_common::{Result, TicketBotError};

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Loads and validates in one step.
    ///
    /// Missing required variables are reported before any malformed
    /// optional value, so the first diagnostic always names every one of them.
    pub fn load_validated(loader: &ConfigLoader) -> Result<(Config, Credentials)> {
        let missing = loader.missing_required();
        if !missing.is_empty() {
            return Err(TicketBotError::MissingConfig(missing));
        }
        let config = loader.load()?;
        let credentials = Self::validate(&config)?;
        Ok((config, credentials))
    }

    /// Checks that every required value is present and usable.
    ///
    /// All missing variables are reported together in one
    /// [`TicketBotError::MissingConfig`].
    pub fn validate(config: &Config) -> Result<Credentials> {
        let token = config.discord.token.as_deref();
        let client_id = config.discord.client_id.as_deref();

        let missing: Vec<String> = [(TOKEN_VAR, token), (CLIENT_ID_VAR, client_id)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.to_string())
            .collect();

        let (Some(token), Some(client_id)) = (token, client_id) else {
            return Err(TicketBotError::MissingConfig(missing));
        };

        let client_id = client_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| TicketBotError::InvalidConfig {
                variable: CLIENT_ID_VAR.to_string(),
                reason: "expected a numeric application id".to_string(),
            })?;

        Ok(Credentials {
            token: token.to_string(),
            client_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, client_id: Option<&str>) -> Config {
        let mut config = Config::default();
        config.discord.token = token.map(str::to_string);
        config.discord.client_id = client_id.map(str::to_string);
        config
    }

    fn missing(config: &Config) -> Vec<String> {
        match ConfigValidator::validate(config) {
            Err(TicketBotError::MissingConfig(names)) => names,
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_both_missing_are_listed() {
        assert_eq!(missing(&config(None, None)), vec![TOKEN_VAR, CLIENT_ID_VAR]);
    }

    #[test]
    fn test_only_the_missing_one_is_listed() {
        assert_eq!(missing(&config(Some("t"), None)), vec![CLIENT_ID_VAR]);
        assert_eq!(missing(&config(None, Some("1"))), vec![TOKEN_VAR]);
    }

    #[test]
    fn test_complete_config_yields_credentials() {
        let credentials = ConfigValidator::validate(&config(Some("token"), Some("99"))).unwrap();
        assert_eq!(credentials.token, "token");
        assert_eq!(credentials.client_id, 99);
        assert!(!format!("{credentials:?}").contains("token\""));
    }

    #[test]
    fn test_non_numeric_client_id_is_invalid() {
        let err = ConfigValidator::validate(&config(Some("token"), Some("abc"))).unwrap_err();
        assert!(matches!(err, TicketBotError::InvalidConfig { .. }));
    }
}
