//! Engine facade.
//!
//! The API surface the dashboard talks to: recommendations, assignment,
//! escalation subscription and runtime threshold tuning. Composition of
//! the registry, conversation store, availability tracker, ranker, quality
//! monitor and escalation engine.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::info;

use crate::{
    adapter::notifier::NotificationSink,
    config::{AlertThresholdsUpdate, EngineConfig, SharedEngineConfig},
    domain::{
        model::{Escalation, MatchResult},
        EngineError, EngineResult,
    },
    repository::{ConversationStore, SellerRegistry},
    service::{
        availability_tracker::AvailabilityTracker,
        escalation_engine::{EscalationEngine, EscalationHandler},
        keyword_extractor::{KeywordExtractor, StoredKeywordExtractor},
        quality_monitor::{DriftSignal, QualityMonitor, QualitySignal},
        recommendation_ranker::RecommendationRanker,
    },
};

struct CachedRecommendations {
    computed_at: Instant,
    results: Vec<MatchResult>,
}

pub struct MatchingEngine {
    registry: Arc<dyn SellerRegistry>,
    conversations: Arc<dyn ConversationStore>,
    tracker: Arc<AvailabilityTracker>,
    ranker: RecommendationRanker,
    monitor: Arc<QualityMonitor>,
    escalations: Arc<EscalationEngine>,
    config: SharedEngineConfig,
    cache: RwLock<HashMap<String, CachedRecommendations>>,
    cache_ttl: Duration,
}

/// Builder-style constructor so callers can swap the pluggable seams
/// (keyword extractor, quality signal, notification sink).
pub struct MatchingEngineBuilder {
    registry: Arc<dyn SellerRegistry>,
    conversations: Arc<dyn ConversationStore>,
    sink: Arc<dyn NotificationSink>,
    config: SharedEngineConfig,
    extractor: Arc<dyn KeywordExtractor>,
    signal: Arc<dyn QualitySignal>,
}

impl MatchingEngineBuilder {
    pub fn new(
        registry: Arc<dyn SellerRegistry>,
        conversations: Arc<dyn ConversationStore>,
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            conversations,
            sink,
            config: SharedEngineConfig::new(config),
            extractor: Arc::new(StoredKeywordExtractor),
            signal: Arc::new(DriftSignal),
        }
    }

    pub fn with_shared_config(mut self, config: SharedEngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_keyword_extractor(mut self, extractor: Arc<dyn KeywordExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_quality_signal(mut self, signal: Arc<dyn QualitySignal>) -> Self {
        self.signal = signal;
        self
    }

    pub async fn build(self) -> Arc<MatchingEngine> {
        let cfg = self.config.current().await;
        let escalations = Arc::new(EscalationEngine::new(self.sink, self.config.clone()));
        let monitor = Arc::new(QualityMonitor::new(
            self.signal,
            self.conversations.clone(),
            escalations.clone(),
            self.config.clone(),
        ));
        Arc::new(MatchingEngine {
            registry: self.registry,
            conversations: self.conversations,
            tracker: Arc::new(AvailabilityTracker::new()),
            ranker: RecommendationRanker::new(self.extractor, cfg.ranking.top_n),
            monitor,
            escalations,
            config: self.config,
            cache: RwLock::new(HashMap::new()),
            cache_ttl: Duration::from_secs(cfg.ranking.cache_ttl_secs),
        })
    }
}

impl MatchingEngine {
    /// Ranked seller recommendations for a conversation, top-N.
    ///
    /// Read-only and request-scoped: dropping the future (dialog closed)
    /// cancels the work. Results are cached briefly per conversation and
    /// invalidated by assignment changes.
    pub async fn get_recommendations(
        &self,
        conversation_id: &str,
    ) -> EngineResult<Vec<MatchResult>> {
        if let Some(cached) = self.cache.read().await.get(conversation_id) {
            if cached.computed_at.elapsed() < self.cache_ttl {
                return Ok(cached.results.clone());
            }
        }

        let conversation = self
            .conversations
            .get(conversation_id)
            .await
            .ok_or_else(|| EngineError::UnknownConversation(conversation_id.to_string()))?;

        let mut sellers = self.registry.list_active_sellers().await;
        for seller in &sellers {
            self.tracker.register(seller).await;
        }
        // Scoring sees the tracked load, not the registry's possibly
        // stale snapshot.
        self.tracker.overlay(&mut sellers).await;

        let results = self.ranker.rank(&conversation, &sellers);
        let mut cache = self.cache.write().await;
        // Expired entries for other conversations are dropped here rather
        // than lingering until the next assignment change.
        cache.retain(|_, c| c.computed_at.elapsed() < self.cache_ttl);
        cache.insert(
            conversation_id.to_string(),
            CachedRecommendations {
                computed_at: Instant::now(),
                results: results.clone(),
            },
        );
        Ok(results)
    }

    /// Assign a seller to a conversation, reserving one capacity slot.
    /// A direct transfer (the conversation already had a seller) releases
    /// the previous seller's slot once the new reservation holds.
    ///
    /// `CapacityExceeded` is returned, not fatal: the transfer UI decides
    /// whether to pick another candidate or force through a different path.
    pub async fn assign_seller(&self, conversation_id: &str, seller_id: &str) -> EngineResult<()> {
        let previous = self
            .conversations
            .get(conversation_id)
            .await
            .ok_or_else(|| EngineError::UnknownConversation(conversation_id.to_string()))?
            .assigned_seller_id;
        if previous.as_deref() == Some(seller_id) {
            return Ok(());
        }

        let seller = self
            .registry
            .get(seller_id)
            .await
            .ok_or_else(|| EngineError::UnknownSeller(seller_id.to_string()))?;
        self.tracker.register(&seller).await;
        self.tracker.reserve(seller_id).await?;

        if let Err(err) = self.conversations.assign_seller(conversation_id, seller_id).await {
            // Undo the reservation if the conversation side failed.
            self.tracker.release(seller_id).await;
            return Err(err);
        }
        if let Some(previous) = previous {
            self.tracker.release(&previous).await;
        }

        if let Some(conversation) = self.conversations.get(conversation_id).await {
            self.monitor.start_monitoring(&conversation).await;
        }
        // Load changed, so every cached ranking is stale.
        self.cache.write().await.clear();
        info!(conversation_id, seller_id, "seller assigned");
        Ok(())
    }

    /// Clear a conversation's assignment, releasing the seller's slot and
    /// stopping quality monitoring.
    pub async fn unassign_seller(&self, conversation_id: &str) -> EngineResult<()> {
        let released = self.conversations.unassign_seller(conversation_id).await?;
        if let Some(seller_id) = released {
            self.tracker.release(&seller_id).await;
            info!(conversation_id, seller_id = %seller_id, "seller unassigned");
        }
        self.monitor.stop_monitoring(conversation_id).await;
        self.cache.write().await.clear();
        Ok(())
    }

    /// A qualifying seller action (reply) happened on the conversation.
    pub async fn record_seller_reply(&self, conversation_id: &str) {
        self.monitor.record_seller_action(conversation_id).await;
    }

    /// Register a push handler for escalation raise/resolve events.
    pub async fn subscribe_escalations(&self, handler: Arc<dyn EscalationHandler>) {
        self.escalations.subscribe(handler).await;
    }

    /// Operator acknowledges the open escalation for a conversation.
    pub async fn acknowledge_escalation(&self, conversation_id: &str) -> EngineResult<()> {
        self.escalations.acknowledge(conversation_id).await.map(|_| ())
    }

    /// Runtime tuning of risk thresholds, strike count and cooldown.
    pub async fn configure_alert_thresholds(
        &self,
        update: AlertThresholdsUpdate,
    ) -> EngineResult<()> {
        self.config
            .update_thresholds(update)
            .await
            .map(|_| ())
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    pub async fn open_escalation(&self, conversation_id: &str) -> Option<Escalation> {
        self.escalations.active_escalation(conversation_id).await
    }

    pub fn quality_monitor(&self) -> Arc<QualityMonitor> {
        self.monitor.clone()
    }

    pub fn shared_config(&self) -> SharedEngineConfig {
        self.config.clone()
    }
}
