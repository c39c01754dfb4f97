//! Engine configuration.
//!
//! Loaded once from file + environment sources, validated, then shared as a
//! reloadable handle: readers take cheap snapshots, and the escalation
//! thresholds can be retuned at runtime through `update_thresholds`.
//! A `watch` channel carries
//! updates to long-lived loops that prefer push over polling.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use tokio::sync::{watch, RwLock};
use tracing::info;

use crate::domain::model::Recipient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub thresholds: AlertThresholds,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub escalation: EscalationConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "vendas_engine=debug".
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between quality-monitor ticks.
    pub tick_interval_secs: u64,
    /// Score a conversation starts with when monitoring begins.
    pub initial_quality_score: f64,
    /// The smoothed score is clamped into [floor, ceiling] on every tick.
    pub quality_floor: f64,
    pub quality_ceiling: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 10,
            initial_quality_score: 7.0,
            quality_floor: 3.0,
            quality_ceiling: 10.0,
        }
    }
}

/// Runtime-tunable escalation knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertThresholds {
    /// Quality score at or above which risk is "baixo".
    pub quality_low_threshold: f64,
    /// Quality score at or above which risk is "medio" (below: "alto").
    pub quality_medium_threshold: f64,
    /// Consecutive "alto" ticks without seller action before raising.
    pub strikes_before_escalation: u32,
    /// Ticks of sustained "baixo" that auto-resolve, and the re-raise
    /// suppression window after a resolve.
    pub cooldown_ticks: u32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            quality_low_threshold: 8.0,
            quality_medium_threshold: 6.0,
            strikes_before_escalation: 3,
            cooldown_ticks: 3,
        }
    }
}

/// Partial threshold update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertThresholdsUpdate {
    pub quality_low_threshold: Option<f64>,
    pub quality_medium_threshold: Option<f64>,
    pub strikes_before_escalation: Option<u32>,
    pub cooldown_ticks: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Maximum number of recommendations returned per conversation.
    pub top_n: usize,
    /// TTL of the per-conversation recommendation cache, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            cache_ttl_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// Ordered recipient ladder; all rungs are notified on a raise,
    /// lowest level first.
    pub ladder: Vec<Recipient>,
    /// Estimated deal value (BRL) by lead temperature, used to fill
    /// `Escalation::estimated_value`.
    pub estimated_value_hot: f64,
    pub estimated_value_warm: f64,
    pub estimated_value_cold: f64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            ladder: vec![
                Recipient {
                    level: 1,
                    role: "supervisor".to_string(),
                    contact: "supervisor@vendas".to_string(),
                },
                Recipient {
                    level: 2,
                    role: "diretor".to_string(),
                    contact: "diretor@vendas".to_string(),
                },
            ],
            estimated_value_hot: 45_000.0,
            estimated_value_warm: 15_000.0,
            estimated_value_cold: 5_000.0,
        }
    }
}

/// Shared, reloadable configuration handle.
#[derive(Clone)]
pub struct SharedEngineConfig {
    inner: Arc<RwLock<EngineConfig>>,
    tx: Arc<watch::Sender<EngineConfig>>,
}

impl SharedEngineConfig {
    /// Load from the given files (later files override earlier ones) plus
    /// `VENDAS__`-prefixed environment variables, then validate.
    pub fn load_from_sources(config_paths: &[PathBuf]) -> Result<Self> {
        let mut builder = Config::builder();
        for path in config_paths {
            if path.exists() {
                builder = builder.add_source(File::from(path.clone()));
                info!(path = %path.display(), "loaded config file");
            } else {
                info!(path = %path.display(), "config file not found, skipping");
            }
        }
        builder = builder.add_source(Environment::with_prefix("VENDAS").separator("__"));

        let built = builder.build().context("failed to build configuration")?;
        let cfg: EngineConfig = built
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        Self::validate(&cfg)?;
        Ok(Self::new(cfg))
    }

    pub fn new(cfg: EngineConfig) -> Self {
        let (tx, _rx) = watch::channel(cfg.clone());
        Self {
            inner: Arc::new(RwLock::new(cfg)),
            tx: Arc::new(tx),
        }
    }

    fn validate(cfg: &EngineConfig) -> Result<()> {
        if cfg.monitor.tick_interval_secs == 0 {
            anyhow::bail!("monitor.tick_interval_secs must be at least 1");
        }
        if cfg.monitor.quality_floor >= cfg.monitor.quality_ceiling {
            anyhow::bail!("monitor.quality_floor must be below quality_ceiling");
        }
        if cfg.thresholds.quality_medium_threshold >= cfg.thresholds.quality_low_threshold {
            anyhow::bail!("quality_medium_threshold must be below quality_low_threshold");
        }
        if cfg.thresholds.strikes_before_escalation == 0 {
            anyhow::bail!("strikes_before_escalation must be at least 1");
        }
        if cfg.escalation.ladder.is_empty() {
            anyhow::bail!("escalation.ladder must have at least one recipient");
        }
        if cfg.ranking.top_n == 0 {
            anyhow::bail!("ranking.top_n must be at least 1");
        }
        Ok(())
    }

    /// Snapshot of the current configuration.
    pub async fn current(&self) -> EngineConfig {
        self.inner.read().await.clone()
    }

    /// Subscribe to configuration updates.
    pub fn watch(&self) -> watch::Receiver<EngineConfig> {
        self.tx.subscribe()
    }

    /// Apply a partial threshold update and broadcast the new snapshot.
    pub async fn update_thresholds(&self, update: AlertThresholdsUpdate) -> Result<EngineConfig> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        if let Some(v) = update.quality_low_threshold {
            next.thresholds.quality_low_threshold = v;
        }
        if let Some(v) = update.quality_medium_threshold {
            next.thresholds.quality_medium_threshold = v;
        }
        if let Some(v) = update.strikes_before_escalation {
            next.thresholds.strikes_before_escalation = v;
        }
        if let Some(v) = update.cooldown_ticks {
            next.thresholds.cooldown_ticks = v;
        }
        Self::validate(&next)?;
        *guard = next.clone();
        // Receivers may have gone away; that is fine.
        let _ = self.tx.send(next.clone());
        info!(
            low = next.thresholds.quality_low_threshold,
            medium = next.thresholds.quality_medium_threshold,
            strikes = next.thresholds.strikes_before_escalation,
            cooldown = next.thresholds.cooldown_ticks,
            "alert thresholds updated"
        );
        Ok(next)
    }
}
