//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name must not be empty")]
    MissingServerName,
    #[error("server.nickname_prefix must not be empty")]
    MissingNicknamePrefix,
    #[error("liveness.interval_ms must be greater than zero")]
    ZeroLivenessInterval,
    #[error("limits.outbound_queue must be greater than zero")]
    ZeroOutboundQueue,
    #[error("http.address must differ from listen.address ({0})")]
    ListenerConflict(std::net::SocketAddr),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.server.nickname_prefix.is_empty() {
        errors.push(ValidationError::MissingNicknamePrefix);
    }
    if config.liveness.interval_ms == 0 {
        errors.push(ValidationError::ZeroLivenessInterval);
    }
    if config.limits.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }
    if let Some(ref http) = config.http
        && http.address == config.listen.address
    {
        errors.push(ValidationError::ListenerConflict(http.address));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
