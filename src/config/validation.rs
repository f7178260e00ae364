//! Configuration validation.
//!
//! Returns every problem found, not just the first. Validation is a pure
//! function: `&ServiceConfig → Result<(), Vec<ValidationError>>`.

use thiserror::Error;

use crate::config::schema::ServiceConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("database.conn must not be empty")]
    EmptyConnectionString,

    #[error("database.max_connections must be at least 1")]
    ZeroPoolSize,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.database.conn.trim().is_empty() {
        errors.push(ValidationError::EmptyConnectionString);
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::ZeroPoolSize);
    }
    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_secs"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("write_secs"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
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

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.port = 0;
        config.database.max_connections = 0;
        config.timeouts.read_secs = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::ZeroPoolSize,
                ValidationError::ZeroTimeout("read_secs"),
                ValidationError::UnknownLogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = ServiceConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
