use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One rung of the escalation ladder: who gets notified at a given level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Ladder position, 1-based (1 = supervisor, 2 = director, ...).
    pub level: u8,
    pub role: String,
    /// Delivery address understood by the notification sink (phone, user id).
    pub contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationStatus {
    Raised,
    Resolved,
}

/// An open (or resolved) escalation for one conversation. Created when risk
/// stays "alto" long enough without seller action; resolved on operator
/// acknowledgement or when risk subsides through the cooldown window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escalation {
    pub id: Uuid,
    pub conversation_id: String,
    pub seller_id: String,
    pub reason: String,
    pub risk_description: String,
    /// Estimated deal value at stake, derived from lead temperature.
    pub estimated_value: f64,
    /// Ladder recipients in notification order.
    pub recipients: Vec<Recipient>,
    /// Recipients whose notification failed; the escalation is still raised
    /// as long as the record itself was created.
    #[serde(default)]
    pub delivery_failures: Vec<String>,
    pub status: EscalationStatus,
    pub raised_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Why an escalation left the raised state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// An operator acknowledged the escalation.
    Acknowledged,
    /// Risk stayed "baixo" for the whole cooldown window.
    RiskSubsided,
    /// The conversation was closed or its seller unassigned while the
    /// escalation was still open.
    ConversationClosed,
}

/// Event pushed to escalation subscribers (dashboard, notification center).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationEvent {
    Raised(Escalation),
    Resolved {
        escalation_id: Uuid,
        conversation_id: String,
        resolution: ResolutionKind,
        resolved_at: DateTime<Utc>,
    },
}
