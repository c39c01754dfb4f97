use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Purchase-urgency classification of the client behind a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadTemperature {
    Hot,
    Warm,
    Cold,
}

/// Who currently owns the conversation on the dashboard side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Bot,
    Manual,
    Seller,
    Waiting,
}

/// Conversation snapshot with the fields matching and monitoring need.
/// Created when a client message first arrives; assignment and status
/// transitions mutate it; archival happens outside the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub client_name: String,
    pub client_phone: String,
    pub lead_temperature: LeadTemperature,
    /// Keyword set derived from message text/metadata by the classifier.
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub assigned_seller_id: Option<String>,
    pub status: ConversationStatus,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Conversation {
    /// True when a seller owns the conversation, which is the condition
    /// for quality monitoring.
    pub fn is_seller_assigned(&self) -> bool {
        self.status == ConversationStatus::Seller && self.assigned_seller_id.is_some()
    }
}
