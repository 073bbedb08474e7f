//! Configuration validation.
//!
//! Serde handles the syntactic checks; this module covers the semantic ones.
//! All violations are collected and returned together, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic violation in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.target_base_url is required")]
    MissingTargetBaseUrl,

    #[error("upstream.target_base_url is not a valid absolute URL: {0}")]
    InvalidTargetBaseUrl(String),

    #[error("upstream.target_base_url must use http or https, got \"{0}\"")]
    UnsupportedScheme(String),

    #[error("upstream.target_base_url has no host")]
    MissingHost,

    #[error("upstream.max_conn must be greater than zero")]
    ZeroMaxConn,

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("listener.bind_address is not a valid socket address: {0}")]
    InvalidBindAddress(String),
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = config.upstream.target_base_url.trim();
    if target.is_empty() {
        errors.push(ValidationError::MissingTargetBaseUrl);
    } else {
        match Url::parse(target) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
                } else if url.host_str().is_none() {
                    errors.push(ValidationError::MissingHost);
                }
            }
            Err(_) => {
                errors.push(ValidationError::InvalidTargetBaseUrl(target.to_string()));
            }
        }
    }

    if config.upstream.max_conn == 0 {
        errors.push(ValidationError::ZeroMaxConn);
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
