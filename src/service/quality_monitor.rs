//! Quality monitor.
//!
//! Tick-driven evaluator over seller-assigned conversations. Each tick it
//! reconciles its monitored set against the conversation store, refreshes
//! every conversation's quality score through the pluggable signal,
//! classifies risk, counts strikes and feeds the escalation engine.
//!
//! The signal function is deliberately not business logic: the shipped
//! `DriftSignal` is the UI-demo stand-in (random jitter); production wires
//! a real signal over response latency, sentiment and recommendation
//! adherence behind the same trait.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
};

use chrono::Utc;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    config::SharedEngineConfig,
    domain::model::{Conversation, QualityAssessment, RiskLevel},
    repository::ConversationStore,
    service::escalation_engine::EscalationEngine,
};

/// Pluggable quality-signal source: proposes the next raw score given the
/// previous one. The monitor clamps the result into its configured range.
pub trait QualitySignal: Send + Sync {
    fn sample(&self, conversation: &Conversation, previous: f64) -> f64;
}

/// Random drift stand-in for development and simulation. Biased slightly
/// downward so unattended conversations degrade, as in the source demo.
pub struct DriftSignal;

impl QualitySignal for DriftSignal {
    fn sample(&self, _conversation: &Conversation, previous: f64) -> f64 {
        previous + rand::thread_rng().gen_range(-1.2..0.8)
    }
}

struct MonitorEntry {
    assessment: QualityAssessment,
    /// Consecutive "alto" ticks without a qualifying seller action.
    strikes: u32,
    /// Set by `record_seller_action`, consumed on the next tick.
    seller_acted: bool,
}

/// Counters for one monitor pass, logged by the scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickSummary {
    pub tick: u64,
    pub evaluated: usize,
    pub risk_changes: usize,
    pub entered: usize,
    pub left: usize,
}

pub struct QualityMonitor {
    entries: RwLock<HashMap<String, MonitorEntry>>,
    signal: Arc<dyn QualitySignal>,
    store: Arc<dyn ConversationStore>,
    escalations: Arc<EscalationEngine>,
    config: SharedEngineConfig,
    tick_seq: AtomicU64,
}

impl QualityMonitor {
    pub fn new(
        signal: Arc<dyn QualitySignal>,
        store: Arc<dyn ConversationStore>,
        escalations: Arc<EscalationEngine>,
        config: SharedEngineConfig,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            signal,
            store,
            escalations,
            config,
            tick_seq: AtomicU64::new(0),
        }
    }

    /// Begin monitoring a conversation (idempotent). Called on assignment
    /// and by the per-tick reconciliation.
    pub async fn start_monitoring(&self, conversation: &Conversation) {
        let Some(seller_id) = conversation.assigned_seller_id.clone() else {
            return;
        };
        let cfg = self.config.current().await;
        let mut entries = self.entries.write().await;
        entries
            .entry(conversation.id.clone())
            .or_insert_with(|| MonitorEntry {
                assessment: QualityAssessment {
                    conversation_id: conversation.id.clone(),
                    seller_id,
                    score: cfg.monitor.initial_quality_score,
                    risk_level: RiskLevel::classify(
                        cfg.monitor.initial_quality_score,
                        cfg.thresholds.quality_low_threshold,
                        cfg.thresholds.quality_medium_threshold,
                    ),
                    alerts_raised: 0,
                    last_evaluated_at: Utc::now(),
                },
                strikes: 0,
                seller_acted: false,
            });
    }

    /// Stop monitoring (conversation closed or seller unassigned).
    pub async fn stop_monitoring(&self, conversation_id: &str) {
        self.entries.write().await.remove(conversation_id);
        self.escalations.forget(conversation_id).await;
    }

    /// A qualifying seller action (e.g. a reply) happened: the strike
    /// counter starts over.
    pub async fn record_seller_action(&self, conversation_id: &str) {
        if let Some(entry) = self.entries.write().await.get_mut(conversation_id) {
            entry.seller_acted = true;
            entry.strikes = 0;
        }
    }

    /// Latest snapshot for one conversation, if monitored.
    pub async fn assessment(&self, conversation_id: &str) -> Option<QualityAssessment> {
        self.entries
            .read()
            .await
            .get(conversation_id)
            .map(|e| e.assessment.clone())
    }

    /// One monitor pass. Per-conversation evaluation is bulkheaded: a bad
    /// signal value for one conversation is logged and skipped without
    /// aborting the rest of the tick.
    pub async fn tick(&self) -> TickSummary {
        let tick = self.tick_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let cfg = self.config.current().await;
        let monitored = self.store.list_monitored_conversations().await;

        let mut summary = TickSummary {
            tick,
            ..TickSummary::default()
        };

        // Reconcile the monitored set before evaluating.
        let monitored_ids: HashSet<&str> = monitored.iter().map(|c| c.id.as_str()).collect();
        let gone: Vec<String> = {
            let entries = self.entries.read().await;
            entries
                .keys()
                .filter(|id| !monitored_ids.contains(id.as_str()))
                .cloned()
                .collect()
        };
        for id in gone {
            self.stop_monitoring(&id).await;
            summary.left += 1;
        }
        for conversation in &monitored {
            if !self.entries.read().await.contains_key(&conversation.id) {
                self.start_monitoring(conversation).await;
                summary.entered += 1;
            }
        }

        for conversation in &monitored {
            let outcome = {
                let mut entries = self.entries.write().await;
                let Some(entry) = entries.get_mut(&conversation.id) else {
                    continue;
                };
                self.evaluate(entry, conversation, &cfg, &mut summary)
            };
            let Some((assessment, strikes)) = outcome else {
                continue;
            };
            self.escalations
                .on_assessment(conversation, &assessment, strikes, tick)
                .await;
            summary.evaluated += 1;
        }

        summary
    }

    /// Refresh one entry. Returns the new assessment and strike count, or
    /// `None` when the signal produced an unusable value.
    fn evaluate(
        &self,
        entry: &mut MonitorEntry,
        conversation: &Conversation,
        cfg: &crate::config::EngineConfig,
        summary: &mut TickSummary,
    ) -> Option<(QualityAssessment, u32)> {
        let proposed = self.signal.sample(conversation, entry.assessment.score);
        if !proposed.is_finite() {
            warn!(
                conversation_id = %conversation.id,
                proposed,
                "quality signal returned unusable value, skipping conversation"
            );
            return None;
        }
        let score = proposed.clamp(cfg.monitor.quality_floor, cfg.monitor.quality_ceiling);
        let risk = RiskLevel::classify(
            score,
            cfg.thresholds.quality_low_threshold,
            cfg.thresholds.quality_medium_threshold,
        );

        if risk != entry.assessment.risk_level {
            entry.assessment.alerts_raised += 1;
            summary.risk_changes += 1;
            info!(
                conversation_id = %conversation.id,
                seller_id = %entry.assessment.seller_id,
                score,
                from = %entry.assessment.risk_level,
                to = %risk,
                "risk level changed"
            );
        }

        if risk == RiskLevel::Alto && !entry.seller_acted {
            entry.strikes += 1;
        } else {
            entry.strikes = 0;
        }
        entry.seller_acted = false;

        entry.assessment.score = score;
        entry.assessment.risk_level = risk;
        entry.assessment.last_evaluated_at = Utc::now();
        if let Some(seller_id) = &conversation.assigned_seller_id {
            entry.assessment.seller_id = seller_id.clone();
        }

        Some((entry.assessment.clone(), entry.strikes))
    }
}
