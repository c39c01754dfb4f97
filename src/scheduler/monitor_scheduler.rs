//! Monitor scheduler.
//!
//! Single timer-driven loop owning the quality-monitor cadence — never one
//! task per conversation. Ticks are awaited inline, so the loop cannot
//! overlap itself; if a tick runs past the next deadline the missed tick
//! is skipped, not queued (`MissedTickBehavior::Skip`). Shutdown is
//! graceful: an in-flight tick finishes before the loop exits, so no
//! partial escalation state is left behind.
//!
//! Usage:
//! - Construct with the monitor and a tick interval, call `start()`.
//! - `handle.trigger_manual()` forces an immediate pass (tests, ops).
//! - `handle.shutdown().await` stops the loop and joins the task.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::service::quality_monitor::QualityMonitor;

#[derive(Clone)]
pub struct MonitorSchedulerConfig {
    pub tick_interval: Duration,
    /// Buffer for manual trigger requests.
    pub manual_trigger_buffer: usize,
}

impl Default for MonitorSchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            manual_trigger_buffer: 4,
        }
    }
}

/// Control handle returned by `start()`.
pub struct MonitorSchedulerHandle {
    trigger_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
    join_handle: JoinHandle<()>,
}

impl MonitorSchedulerHandle {
    /// Request an immediate monitor pass (non-blocking; dropped when the
    /// trigger buffer is full).
    pub fn trigger_manual(&self) -> Result<(), String> {
        self.trigger_tx
            .try_send(())
            .map_err(|e| format!("failed to send manual trigger: {e}"))
    }

    /// Stop the loop after any in-flight tick completes.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(()).await;
        self.join_handle.await.context("monitor scheduler join failed")?;
        Ok(())
    }
}

pub struct MonitorScheduler {
    monitor: Arc<QualityMonitor>,
    config: MonitorSchedulerConfig,
}

impl MonitorScheduler {
    pub fn new(monitor: Arc<QualityMonitor>, config: MonitorSchedulerConfig) -> Self {
        Self { monitor, config }
    }

    /// Run the loop in the background and return its control handle.
    pub fn start(self) -> MonitorSchedulerHandle {
        let (trigger_tx, mut trigger_rx) = mpsc::channel(self.config.manual_trigger_buffer);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let monitor = self.monitor;
        let interval = self.config.tick_interval;
        let join_handle = tokio::spawn(async move {
            info!(?interval, "monitor scheduler started");
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // Consume the immediate first tick so the cadence starts one
            // interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let summary = monitor.tick().await;
                        debug!(
                            tick = summary.tick,
                            evaluated = summary.evaluated,
                            risk_changes = summary.risk_changes,
                            entered = summary.entered,
                            left = summary.left,
                            "monitor tick complete"
                        );
                    }
                    maybe = trigger_rx.recv() => {
                        if maybe.is_some() {
                            info!("manual monitor tick requested");
                            let summary = monitor.tick().await;
                            debug!(tick = summary.tick, evaluated = summary.evaluated, "manual tick complete");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("monitor scheduler shutdown requested");
                        break;
                    }
                }
            }
            info!("monitor scheduler loop exiting");
        });

        MonitorSchedulerHandle {
            trigger_tx,
            shutdown_tx,
            join_handle,
        }
    }
}
