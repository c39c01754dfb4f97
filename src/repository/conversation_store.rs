//! Conversation store abstraction.
//!
//! Persistence lives outside the engine; this trait carries only the
//! operations matching and monitoring need. Assignment transitions go
//! through the store so the monitor's view and the dashboard's view agree.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    model::{Conversation, ConversationStatus},
    EngineError, EngineResult,
};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, conversation_id: &str) -> Option<Conversation>;

    /// Active, seller-assigned conversations — the quality monitor's input.
    async fn list_monitored_conversations(&self) -> Vec<Conversation>;

    /// Assign a seller and move the conversation to `seller` status.
    async fn assign_seller(&self, conversation_id: &str, seller_id: &str) -> EngineResult<()>;

    /// Clear the assignment, moving the conversation back to `waiting`.
    /// Returns the seller that was released, if any.
    async fn unassign_seller(&self, conversation_id: &str) -> EngineResult<Option<String>>;
}

#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, conversation: Conversation) {
        self.conversations
            .write()
            .await
            .insert(conversation.id.clone(), conversation);
    }

    pub async fn seed(conversations: Vec<Conversation>) -> Arc<Self> {
        let store = Arc::new(Self::new());
        for conversation in conversations {
            store.upsert(conversation).await;
        }
        store
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, conversation_id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(conversation_id).cloned()
    }

    async fn list_monitored_conversations(&self) -> Vec<Conversation> {
        self.conversations
            .read()
            .await
            .values()
            .filter(|c| c.is_seller_assigned())
            .cloned()
            .collect()
    }

    async fn assign_seller(&self, conversation_id: &str, seller_id: &str) -> EngineResult<()> {
        let mut guard = self.conversations.write().await;
        let conversation = guard
            .get_mut(conversation_id)
            .ok_or_else(|| EngineError::UnknownConversation(conversation_id.to_string()))?;
        conversation.assigned_seller_id = Some(seller_id.to_string());
        conversation.status = ConversationStatus::Seller;
        conversation.last_activity_at = Utc::now();
        Ok(())
    }

    async fn unassign_seller(&self, conversation_id: &str) -> EngineResult<Option<String>> {
        let mut guard = self.conversations.write().await;
        let conversation = guard
            .get_mut(conversation_id)
            .ok_or_else(|| EngineError::UnknownConversation(conversation_id.to_string()))?;
        let released = conversation.assigned_seller_id.take();
        conversation.status = ConversationStatus::Waiting;
        conversation.last_activity_at = Utc::now();
        Ok(released)
    }
}
