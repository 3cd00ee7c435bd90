// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `checkpoint check` command implementation.
//!
//! Runs one verification through the same gateway the server uses and
//! prints the result as JSON.

use std::str::FromStr;
use std::sync::Arc;

use checkpoint_config::CheckpointConfig;
use checkpoint_core::{CheckpointError, DomainKind};
use tokio_util::sync::CancellationToken;

use crate::app::{Gateways, build_cache};

/// Parse the command line's domain and JSON query.
fn parse_request(
    domain: &str,
    query: &str,
) -> Result<(DomainKind, serde_json::Value), CheckpointError> {
    let kind = DomainKind::from_str(domain)
        .ok()
        .filter(|kind| DomainKind::STATUS_DOMAINS.contains(kind))
        .ok_or_else(|| {
            CheckpointError::validation("domain", format!("unknown verification domain `{domain}`"))
        })?;
    let body = serde_json::from_str(query)
        .map_err(|e| CheckpointError::validation("query", format!("not valid JSON: {e}")))?;
    Ok((kind, body))
}

/// Runs the `checkpoint check` command.
pub async fn run_check(
    config: &CheckpointConfig,
    domain: &str,
    query: &str,
) -> Result<(), CheckpointError> {
    let (kind, body) = parse_request(domain, query)?;

    let cache = Arc::new(build_cache(&config.cache).await);
    let gateways = Gateways::from_config(&config.domains, &cache)?;
    let cancel = CancellationToken::new();

    let result = gateways.verify_json(kind, body, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_domain_and_query() {
        let (kind, body) = parse_request("work_permit", r#"{"series":"77","number":"1"}"#).unwrap();
        assert_eq!(kind, DomainKind::WorkPermit);
        assert_eq!(body["series"], "77");
    }

    #[test]
    fn rejects_unknown_and_watch_only_domains() {
        assert!(parse_request("visa", "{}").is_err());
        assert!(parse_request("legislation", "{}").is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_request("inn", "{not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
