//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, ServerSettings, TlsMode};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("server name is required")]
    MissingServerName,
    #[error("[{0}] host is required")]
    MissingHost(String),
    #[error("[{0}] duplicate server name")]
    DuplicateServer(String),
    #[error("[{0}] flood_penalty must be positive, got {1}")]
    InvalidFloodPenalty(String, f64),
    #[error("[{0}] flood_threshold must be positive, got {1}")]
    InvalidFloodThreshold(String, f64),
    #[error("[{0}] connect_timeout must be at least 1 second")]
    InvalidConnectTimeout(String),
    #[error("[{0}] tls_client_cert does not exist: {1}")]
    TlsCertNotFound(String, String),
    #[error("[{0}] tls_client_key does not exist: {1}")]
    TlsKeyNotFound(String, String),
    #[error("[{0}] tls_server_cert does not exist: {1}")]
    TlsServerCertNotFound(String, String),
    #[error("[{0}] socks_username requires socks_password")]
    SocksPasswordMissing(String),
    #[error("client.autoconnect names unknown server '{0}'")]
    UnknownAutoconnect(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (i, server) in config.servers.iter().enumerate() {
        validate_server_into(server, &mut errors);
        if config.servers[..i].iter().any(|s| s.name == server.name) {
            errors.push(ValidationError::DuplicateServer(server.name.clone()));
        }
    }

    for name in &config.client.autoconnect {
        if config.server(name).is_none() {
            errors.push(ValidationError::UnknownAutoconnect(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single server block.
pub fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_server_into(server, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_server_into(server: &ServerSettings, errors: &mut Vec<ValidationError>) {
    let name = &server.name;

    if name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if server.host.is_empty() {
        errors.push(ValidationError::MissingHost(name.clone()));
    }

    // Flood control
    if server.flood_penalty <= 0.0 || !server.flood_penalty.is_finite() {
        errors.push(ValidationError::InvalidFloodPenalty(
            name.clone(),
            server.flood_penalty,
        ));
    }
    if server.flood_threshold <= 0.0 || !server.flood_threshold.is_finite() {
        errors.push(ValidationError::InvalidFloodThreshold(
            name.clone(),
            server.flood_threshold,
        ));
    }
    if server.connect_timeout == 0 {
        errors.push(ValidationError::InvalidConnectTimeout(name.clone()));
    }

    // TLS files are only read when TLS is in use
    if server.tls != TlsMode::No {
        if let Some(cert) = &server.tls_client_cert
            && !Path::new(cert).exists()
        {
            errors.push(ValidationError::TlsCertNotFound(
                name.clone(),
                cert.display().to_string(),
            ));
        }
        if let Some(key) = &server.tls_client_key
            && !Path::new(key).exists()
        {
            errors.push(ValidationError::TlsKeyNotFound(
                name.clone(),
                key.display().to_string(),
            ));
        }
        if let Some(ca) = &server.tls_server_cert
            && !Path::new(ca).exists()
        {
            errors.push(ValidationError::TlsServerCertNotFound(
                name.clone(),
                ca.display().to_string(),
            ));
        }
    }

    if server.socks_username.is_some() && server.socks_password.is_none() {
        errors.push(ValidationError::SocksPasswordMissing(name.clone()));
    }
}
