//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("irc.nick is required")]
    MissingNick,
    #[error("irc.password is required")]
    MissingPassword,
    #[error("irc.address must be host:port, got '{0}'")]
    InvalidAddress(String),
    #[error("bot.interject_threshold must be greater than zero")]
    ZeroThreshold,
    #[error("bot.audit_list must not be empty")]
    EmptyAuditList,
    #[error("{field} does not exist: {path}")]
    FileNotFound { field: &'static str, path: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Required fields
    if config.irc.nick.trim().is_empty() {
        errors.push(ValidationError::MissingNick);
    }
    if config.irc.password.trim().is_empty() {
        errors.push(ValidationError::MissingPassword);
    }
    match config.irc.address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
        _ => errors.push(ValidationError::InvalidAddress(config.irc.address.clone())),
    }

    if config.bot.interject_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    if config.bot.audit_list.is_empty() {
        errors.push(ValidationError::EmptyAuditList);
    }

    // Optional files must exist when set
    let files = [
        ("bot.interjection_file", &config.bot.interjection_file),
        ("bot.quotes_file", &config.bot.quotes_file),
        ("bot.rules_file", &config.bot.rules_file),
    ];
    for (field, path) in files {
        if let Some(path) = path
            && !Path::new(path).exists()
        {
            errors.push(ValidationError::FileNotFound {
                field,
                path: path.display().to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[irc]
nick = "gnubot"
password = "oauth:abc"
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = Config::from_toml(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_credentials_fail() {
        let config = Config::from_toml(
            r#"
[irc]
nick = ""
password = " "
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingNick)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingPassword)));
    }

    #[test]
    fn test_zero_threshold_fails() {
        let toml = format!("{}\n[bot]\ninterject_threshold = 0\n", minimal_valid_config());
        let config = Config::from_toml(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroThreshold)));
    }

    #[test]
    fn test_bad_address_fails() {
        let config = Config::from_toml(
            r#"
[irc]
address = "irc.chat.twitch.tv"
nick = "gnubot"
password = "oauth:abc"
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidAddress(_))));
    }

    #[test]
    fn test_missing_rules_file_fails() {
        let toml = format!(
            "{}\n[bot]\nrules_file = \"/nonexistent/rules.toml\"\n",
            minimal_valid_config()
        );
        let config = Config::from_toml(&toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::FileNotFound { field: "bot.rules_file", .. }
        )));
    }
}
