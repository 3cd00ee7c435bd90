// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Catches constraints serde cannot express: an enabled domain without an
//! endpoint, zero retry attempts, a breaker that can never open.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{CacheBackendKind, CheckpointConfig, DomainConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &CheckpointConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    }

    if config.cache.backend == CacheBackendKind::Sqlite && config.cache.sqlite_path.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "cache.sqlite_path must not be empty when cache.backend = \"sqlite\"",
        ));
    }

    if config.cache.operation_timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "cache.operation_timeout_ms must be at least 1",
        ));
    }

    for (name, domain) in config.domains.iter() {
        validate_domain(name, domain, &mut errors);
    }

    let legislation = &config.legislation;
    if legislation.enabled && legislation.sources.is_empty() {
        errors.push(ConfigError::validation(
            "legislation.sources must list at least one law when legislation.enabled = true",
        ));
    }
    if legislation.change_threshold_percent.is_nan() || legislation.change_threshold_percent < 0.0 {
        errors.push(ConfigError::validation(format!(
            "legislation.change_threshold_percent must be non-negative, got {}",
            legislation.change_threshold_percent
        )));
    }
    if legislation.poll_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "legislation.poll_interval_secs must be at least 1",
        ));
    }
    if legislation.retry_attempts == 0 {
        errors.push(ConfigError::validation(
            "legislation.retry_attempts must be at least 1",
        ));
    }
    if legislation.circuit_breaker_threshold == 0 {
        errors.push(ConfigError::validation(
            "legislation.circuit_breaker_threshold must be at least 1",
        ));
    }

    let mut seen = HashSet::new();
    for (i, source) in legislation.sources.iter().enumerate() {
        if source.law_id.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "legislation.sources[{i}].law_id must not be empty"
            )));
        }
        if !seen.insert(source.law_id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate law_id `{}` in [[legislation.sources]]",
                source.law_id
            )));
        }
        if !is_http_url(&source.url) {
            errors.push(ConfigError::validation(format!(
                "legislation.sources[{i}].url must be an http(s) URL, got `{}`",
                source.url
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_domain(name: &str, domain: &DomainConfig, errors: &mut Vec<ConfigError>) {
    if domain.enabled {
        match domain.endpoint.as_deref() {
            None => errors.push(ConfigError::validation(format!(
                "domains.{name}.endpoint is required when domains.{name}.enabled = true"
            ))),
            Some(url) if !is_http_url(url) => errors.push(ConfigError::validation(format!(
                "domains.{name}.endpoint must be an http(s) URL, got `{url}`"
            ))),
            Some(_) => {}
        }
    }

    if domain.retry_attempts == 0 {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.retry_attempts must be at least 1"
        )));
    }

    if domain.circuit_breaker_threshold == 0 {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.circuit_breaker_threshold must be at least 1"
        )));
    }

    if domain.timeout_secs == 0 {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.timeout_secs must be at least 1"
        )));
    }

    if domain.retry_max_delay_ms < domain.retry_delay_ms {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.retry_max_delay_ms ({}) must not be below retry_delay_ms ({})",
            domain.retry_max_delay_ms, domain.retry_delay_ms
        )));
    }

    if domain.max_concurrency == Some(0) {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.max_concurrency must be at least 1 when set"
        )));
    }

    if domain.deadline_secs == Some(0) {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.deadline_secs must be at least 1 when set"
        )));
    }

    if domain.fallback_message.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "domains.{name}.fallback_message must not be empty"
        )));
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LawSourceConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CheckpointConfig::default()).is_ok());
    }

    #[test]
    fn enabled_domain_without_endpoint_fails() {
        let mut config = CheckpointConfig::default();
        config.domains.inn.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("domains.inn.endpoint"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = CheckpointConfig::default();
        config.domains.patent.retry_attempts = 0;
        config.domains.patent.circuit_breaker_threshold = 0;
        config.domains.entry_ban.max_concurrency = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn duplicate_law_ids_rejected() {
        let mut config = CheckpointConfig::default();
        let source = LawSourceConfig {
            law_id: "115-fz".into(),
            title: "О правовом положении иностранных граждан".into(),
            url: "https://example.org/115".into(),
        };
        config.legislation.sources = vec![source.clone(), source];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("duplicate law_id")));
    }

    #[test]
    fn nan_threshold_rejected() {
        let mut config = CheckpointConfig::default();
        config.legislation.change_threshold_percent = f64::NAN;
        assert!(validate_config(&config).is_err());
    }
}
