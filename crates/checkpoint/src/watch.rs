// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `checkpoint watch` command implementation.
//!
//! Runs the legislation watcher in the foreground and prints published
//! change events as JSON lines.

use std::sync::Arc;

use checkpoint_config::CheckpointConfig;
use checkpoint_core::CheckpointError;
use checkpoint_watch::{BroadcastPublisher, WatchOutcome};
use tokio::sync::broadcast::error::RecvError;

use crate::app::build_watcher;
use crate::shutdown;

/// One-line description of a poll outcome.
fn describe(outcome: &WatchOutcome) -> String {
    match outcome {
        WatchOutcome::Baseline => "baseline recorded".to_string(),
        WatchOutcome::Unchanged => "unchanged".to_string(),
        WatchOutcome::Minor { change_percentage } => {
            format!("minor change ({change_percentage:.2}%), baseline updated")
        }
        WatchOutcome::Published(event) => {
            format!("change published ({:.2}%)", event.change_percentage)
        }
        WatchOutcome::PublishFailed { error } => format!("publish failed: {error}"),
        WatchOutcome::Unavailable { error } => format!("unavailable: {error}"),
        WatchOutcome::Skipped => "skipped (circuit open)".to_string(),
    }
}

/// Runs the `checkpoint watch` command.
///
/// With `once`, every source is polled a single time; since nothing is
/// persisted between runs that only records baselines.
pub async fn run_watch(config: &CheckpointConfig, once: bool) -> Result<(), CheckpointError> {
    if config.legislation.sources.is_empty() {
        return Err(CheckpointError::Config(
            "no [[legislation.sources]] configured".to_string(),
        ));
    }

    let publisher = BroadcastPublisher::default();
    let mut events = publisher.subscribe();
    let watcher = build_watcher(&config.legislation, Arc::new(publisher))?;
    let cancel = shutdown::install_signal_handler();

    if once {
        for (law_id, outcome) in watcher.run_once(&cancel).await {
            println!("{law_id}: {}", describe(&outcome));
        }
        cancel.cancel();
        return Ok(());
    }

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", event.payload),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    watcher.run(cancel).await;
    drop(watcher);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "event printer task failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_outcomes() {
        assert_eq!(describe(&WatchOutcome::Baseline), "baseline recorded");
        assert_eq!(
            describe(&WatchOutcome::Minor {
                change_percentage: 1.5
            }),
            "minor change (1.50%), baseline updated"
        );
        assert_eq!(
            describe(&WatchOutcome::Unavailable {
                error: "HTTP 502".into()
            }),
            "unavailable: HTTP 502"
        );
    }

    #[tokio::test]
    async fn watch_requires_sources() {
        let config = CheckpointConfig::default();
        let err = run_watch(&config, true).await.unwrap_err();
        assert!(matches!(err, CheckpointError::Config(_)));
    }
}
