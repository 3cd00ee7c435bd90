// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `checkpoint serve` command implementation.
//!
//! Starts the HTTP endpoints over the five verification gateways, the cache
//! purge loop and, when enabled, the legislation watcher. All stop on
//! SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Instant;

use checkpoint_config::CheckpointConfig;
use checkpoint_core::CheckpointError;
use checkpoint_watch::{BroadcastPublisher, PublishedEvent};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::{Gateways, build_cache, build_watcher};
use crate::server::{AppState, start_server};
use crate::shutdown;

/// Runs the `checkpoint serve` command.
pub async fn run_serve(config: CheckpointConfig) -> Result<(), CheckpointError> {
    init_tracing(&config.service.log_level);
    info!(service = %config.service.name, "starting checkpoint");

    let prometheus = PrometheusBuilder::new().install_recorder().map_err(|e| {
        CheckpointError::Internal(format!("failed to install Prometheus recorder: {e}"))
    })?;
    checkpoint_gateway::metrics::register_metrics();
    info!("prometheus metrics recorder installed");

    let cache = Arc::new(build_cache(&config.cache).await);
    let gateways = Arc::new(Gateways::from_config(&config.domains, &cache)?);
    let cancel = shutdown::install_signal_handler();

    let purge_task = config.cache.purge_interval().map(|every| {
        let cache = cache.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { cache.run_purge(every, cancel).await })
    });

    let mut watcher = None;
    let mut watcher_task = None;
    if config.legislation.enabled {
        let publisher = BroadcastPublisher::default();
        tokio::spawn(log_events(publisher.subscribe(), cancel.clone()));

        let built = Arc::new(build_watcher(&config.legislation, Arc::new(publisher))?);
        let task = {
            let built = built.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { built.run(cancel).await })
        };
        watcher = Some(built);
        watcher_task = Some(task);
    } else {
        info!("legislation watcher disabled");
    }

    let state = AppState {
        gateways,
        cache,
        watcher,
        start_time: Instant::now(),
        prometheus_render: Some(Arc::new(move || prometheus.render())),
        shutdown: cancel.clone(),
    };

    let served = start_server(&config.server.host, config.server.port, state).await;

    // A bind failure returns before any signal; stop background tasks either way.
    cancel.cancel();
    if let Some(task) = purge_task
        && let Err(e) = task.await
    {
        warn!(error = %e, "cache purge task failed");
    }
    if let Some(task) = watcher_task
        && let Err(e) = task.await
    {
        warn!(error = %e, "legislation watcher task failed");
    }

    info!("checkpoint stopped");
    served
}

/// Logs every published legislation event until shutdown.
async fn log_events(mut events: broadcast::Receiver<PublishedEvent>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => info!(
                    topic = %event.topic,
                    law_id = %event.payload["lawId"],
                    change_percentage = %event.payload["changePercentage"],
                    "legislation change event"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event logger lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
}

/// Initialize the tracing subscriber with an environment filter.
///
/// `RUST_LOG` wins over the configured level when set. Output goes to stderr
/// so commands that print JSON keep stdout clean.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("checkpoint={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
