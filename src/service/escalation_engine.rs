//! Escalation engine.
//!
//! Per-conversation state machine `none -> raised -> resolved`, driven by
//! the quality monitor's assessments.
//!
//! Raise condition: risk "alto" for at least `strikes_before_escalation`
//! consecutive ticks with no qualifying seller action in between. A single
//! bad tick never raises — that rule exists to prevent alert storms.
//! While raised, further "alto" ticks are suppressed. Resolution happens on
//! operator acknowledgement or after risk holds "baixo" for the cooldown
//! window; a fresh raise is then suppressed until the cooldown has fully
//! elapsed since the resolve.
//!
//! Fan-out is sequential over the recipient ladder; one recipient's
//! delivery failure is logged and recorded on the escalation, never
//! failing the raise or the remaining recipients. The state-map lock is
//! never held across fan-out or subscriber callbacks, so escalations for
//! different conversations do not block each other and subscribers may
//! call back into the engine.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    adapter::notifier::NotificationSink,
    config::SharedEngineConfig,
    domain::{
        model::{
            Conversation, Escalation, EscalationEvent, EscalationStatus, LeadTemperature,
            QualityAssessment, ResolutionKind, RiskLevel,
        },
        EngineError, EngineResult,
    },
};

/// Push interface the dashboard/notification layer registers against.
#[async_trait]
pub trait EscalationHandler: Send + Sync {
    async fn on_event(&self, event: &EscalationEvent);
}

#[derive(Default)]
struct ConversationState {
    active: Option<Escalation>,
    /// Consecutive "baixo" ticks while raised; drives auto-resolution.
    baixo_streak: u32,
    /// Tick at which the last escalation resolved; gates re-raises.
    last_resolved_tick: Option<u64>,
}

impl ConversationState {
    /// Close the active escalation, if any, recording the resolve tick.
    fn finish(&mut self, resolution: ResolutionKind, tick: u64) -> Option<EscalationEvent> {
        let mut escalation = self.active.take()?;
        let resolved_at = Utc::now();
        escalation.status = EscalationStatus::Resolved;
        escalation.resolved_at = Some(resolved_at);
        self.last_resolved_tick = Some(tick);
        self.baixo_streak = 0;
        info!(
            conversation_id = %escalation.conversation_id,
            escalation_id = %escalation.id,
            resolution = ?resolution,
            "escalation resolved"
        );
        Some(EscalationEvent::Resolved {
            escalation_id: escalation.id,
            conversation_id: escalation.conversation_id,
            resolution,
            resolved_at,
        })
    }
}

pub struct EscalationEngine {
    states: RwLock<HashMap<String, ConversationState>>,
    sink: Arc<dyn NotificationSink>,
    handlers: RwLock<Vec<Arc<dyn EscalationHandler>>>,
    config: SharedEngineConfig,
    /// Highest monitor tick observed; acknowledgements arrive between
    /// ticks and borrow this for cooldown bookkeeping.
    last_tick: AtomicU64,
}

impl EscalationEngine {
    pub fn new(sink: Arc<dyn NotificationSink>, config: SharedEngineConfig) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            sink,
            handlers: RwLock::new(Vec::new()),
            config,
            last_tick: AtomicU64::new(0),
        }
    }

    pub async fn subscribe(&self, handler: Arc<dyn EscalationHandler>) {
        self.handlers.write().await.push(handler);
    }

    pub async fn active_escalation(&self, conversation_id: &str) -> Option<Escalation> {
        self.states
            .read()
            .await
            .get(conversation_id)
            .and_then(|s| s.active.clone())
    }

    /// Feed one assessment from the monitor. `strikes` is the monitor's
    /// count of consecutive "alto" ticks without qualifying seller action.
    pub async fn on_assessment(
        &self,
        conversation: &Conversation,
        assessment: &QualityAssessment,
        strikes: u32,
        tick: u64,
    ) {
        self.last_tick.fetch_max(tick, Ordering::Relaxed);
        let cfg = self.config.current().await;
        let thresholds = cfg.thresholds;

        let mut raised: Option<Escalation> = None;
        let mut resolved: Option<EscalationEvent> = None;
        {
            let mut states = self.states.write().await;
            let state = states.entry(conversation.id.clone()).or_default();

            if state.active.is_some() {
                // Re-raise while raised is suppressed by construction.
                match assessment.risk_level {
                    RiskLevel::Baixo => {
                        state.baixo_streak += 1;
                        if state.baixo_streak >= thresholds.cooldown_ticks {
                            resolved = state.finish(ResolutionKind::RiskSubsided, tick);
                        }
                    }
                    _ => state.baixo_streak = 0,
                }
            } else if assessment.risk_level == RiskLevel::Alto
                && strikes >= thresholds.strikes_before_escalation
                && Self::cooldown_elapsed(state.last_resolved_tick, tick, thresholds.cooldown_ticks)
            {
                let escalation =
                    Self::build_escalation(&cfg.escalation, conversation, assessment, strikes);
                state.active = Some(escalation.clone());
                state.baixo_streak = 0;
                raised = Some(escalation);
            }
        }

        if let Some(escalation) = raised {
            let escalation = self.fan_out(escalation).await;
            self.emit(&EscalationEvent::Raised(escalation)).await;
        }
        if let Some(event) = resolved {
            self.emit(&event).await;
        }
    }

    /// Cooldown gate. When the recorded resolve tick is ahead of the
    /// current tick (clock skew, restart), err on the quiet side.
    fn cooldown_elapsed(last_resolved: Option<u64>, tick: u64, cooldown_ticks: u32) -> bool {
        match last_resolved {
            None => true,
            Some(resolved) if resolved > tick => false,
            Some(resolved) => tick - resolved > cooldown_ticks as u64,
        }
    }

    fn build_escalation(
        cfg: &crate::config::EscalationConfig,
        conversation: &Conversation,
        assessment: &QualityAssessment,
        strikes: u32,
    ) -> Escalation {
        let estimated_value = match conversation.lead_temperature {
            LeadTemperature::Hot => cfg.estimated_value_hot,
            LeadTemperature::Warm => cfg.estimated_value_warm,
            LeadTemperature::Cold => cfg.estimated_value_cold,
        };
        Escalation {
            id: Uuid::new_v4(),
            conversation_id: conversation.id.clone(),
            seller_id: assessment.seller_id.clone(),
            reason: format!("Risco alto há {strikes} avaliações sem resposta do vendedor"),
            risk_description: format!(
                "Qualidade da conversa com {} caiu para {:.1}",
                conversation.client_name, assessment.score
            ),
            estimated_value,
            recipients: cfg.ladder.clone(),
            delivery_failures: Vec::new(),
            status: EscalationStatus::Raised,
            raised_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Notify the ladder sequentially; record failures on the escalation
    /// (both the returned copy and the stored state).
    async fn fan_out(&self, mut escalation: Escalation) -> Escalation {
        info!(
            conversation_id = %escalation.conversation_id,
            seller_id = %escalation.seller_id,
            escalation_id = %escalation.id,
            estimated_value = escalation.estimated_value,
            "escalation raised"
        );
        let message = format!(
            "Escalonamento: {} | {} | Valor estimado R$ {:.0}",
            escalation.reason, escalation.risk_description, escalation.estimated_value
        );
        for recipient in escalation.recipients.clone() {
            if let Err(err) = self.sink.send(&recipient, &message).await {
                warn!(
                    contact = %recipient.contact,
                    error = %err,
                    "escalation notification failed"
                );
                escalation.delivery_failures.push(recipient.contact.clone());
            }
        }

        if !escalation.delivery_failures.is_empty() {
            let mut states = self.states.write().await;
            if let Some(state) = states.get_mut(&escalation.conversation_id) {
                if let Some(active) = state.active.as_mut() {
                    if active.id == escalation.id {
                        active.delivery_failures = escalation.delivery_failures.clone();
                    }
                }
            }
        }
        escalation
    }

    /// Operator acknowledgement from the dashboard.
    pub async fn acknowledge(&self, conversation_id: &str) -> EngineResult<EscalationEvent> {
        let tick = self.last_tick.load(Ordering::Relaxed);
        let event = {
            let mut states = self.states.write().await;
            states
                .get_mut(conversation_id)
                .and_then(|state| state.finish(ResolutionKind::Acknowledged, tick))
                .ok_or_else(|| EngineError::NoOpenEscalation(conversation_id.to_string()))?
        };
        self.emit(&event).await;
        Ok(event)
    }

    /// Conversation closed or seller unassigned: drop tracking, resolving
    /// any open escalation first.
    pub async fn forget(&self, conversation_id: &str) {
        let tick = self.last_tick.load(Ordering::Relaxed);
        let event = {
            let mut states = self.states.write().await;
            let event = states
                .get_mut(conversation_id)
                .and_then(|state| state.finish(ResolutionKind::ConversationClosed, tick));
            states.remove(conversation_id);
            event
        };
        if let Some(event) = event {
            self.emit(&event).await;
        }
    }

    async fn emit(&self, event: &EscalationEvent) {
        let handlers = self.handlers.read().await.clone();
        for handler in handlers {
            handler.on_event(event).await;
        }
    }
}
