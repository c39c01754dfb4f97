//! API-surface tests for the engine facade: recommendations, assignment
//! with capacity handling, and runtime threshold configuration.

use std::sync::Arc;

use chrono::Utc;

use vendas_engine::{
    adapter::notifier::ChannelSink,
    repository::{InMemoryConversationStore, InMemorySellerRegistry},
    AlertThresholdsUpdate, Conversation, ConversationStatus, EngineConfig, EngineError,
    LeadTemperature, MatchingEngine, MatchingEngineBuilder, Seller, SellerStatus,
};

fn seller(id: &str, performance: f64, current: u32, max: u32) -> Seller {
    Seller {
        id: id.to_string(),
        name: format!("Vendedor {id}"),
        specialties: ["energia"].iter().map(|s| s.to_string()).collect(),
        performance_score: performance,
        current_clients: current,
        max_concurrent_clients: max,
        response_time_avg_seconds: 60,
        status: SellerStatus::Active,
    }
}

fn waiting_conversation(id: &str) -> Conversation {
    let now = Utc::now();
    Conversation {
        id: id.to_string(),
        client_name: "Cliente".to_string(),
        client_phone: "+5511988887777".to_string(),
        lead_temperature: LeadTemperature::Warm,
        keywords: ["energia"].iter().map(|s| s.to_string()).collect(),
        assigned_seller_id: None,
        status: ConversationStatus::Waiting,
        started_at: now,
        last_activity_at: now,
    }
}

async fn engine(sellers: Vec<Seller>, conversations: Vec<Conversation>) -> Arc<MatchingEngine> {
    let registry = InMemorySellerRegistry::seed(sellers).await;
    let store = InMemoryConversationStore::seed(conversations).await;
    let (sink, _rx) = ChannelSink::new();
    MatchingEngineBuilder::new(registry, store, Arc::new(sink), EngineConfig::default())
        .build()
        .await
}

#[tokio::test]
async fn recommendations_are_ranked_and_capped_at_top_n() {
    let sellers = vec![
        seller("a", 5.0, 0, 10),
        seller("b", 9.5, 0, 10),
        seller("c", 7.0, 0, 10),
        seller("d", 8.0, 0, 10),
    ];
    let engine = engine(sellers, vec![waiting_conversation("c1")]).await;

    let results = engine.get_recommendations("c1").await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].seller_id, "b");
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn unknown_conversation_is_an_error() {
    let engine = engine(vec![seller("a", 5.0, 0, 10)], vec![]).await;
    assert!(matches!(
        engine.get_recommendations("ghost").await,
        Err(EngineError::UnknownConversation(_))
    ));
}

#[tokio::test]
async fn assignment_reserves_capacity_and_starts_monitoring() {
    let engine = engine(
        vec![seller("a", 8.0, 0, 1)],
        vec![waiting_conversation("c1"), waiting_conversation("c2")],
    )
    .await;

    engine.assign_seller("c1", "a").await.unwrap();
    assert!(engine.quality_monitor().assessment("c1").await.is_some());

    // The only slot is taken; a second transfer is refused but not fatal.
    assert!(matches!(
        engine.assign_seller("c2", "a").await,
        Err(EngineError::CapacityExceeded { .. })
    ));

    engine.unassign_seller("c1").await.unwrap();
    assert!(engine.quality_monitor().assessment("c1").await.is_none());
    engine.assign_seller("c2", "a").await.unwrap();
}

#[tokio::test]
async fn assignment_to_unknown_seller_fails_without_reserving() {
    let engine = engine(vec![seller("a", 8.0, 0, 2)], vec![waiting_conversation("c1")]).await;
    assert!(matches!(
        engine.assign_seller("c1", "ghost").await,
        Err(EngineError::UnknownSeller(_))
    ));
    engine.assign_seller("c1", "a").await.unwrap();
}

#[tokio::test]
async fn transfer_between_sellers_releases_the_previous_slot() {
    let engine = engine(
        vec![seller("a", 8.0, 0, 1), seller("b", 8.0, 0, 1)],
        vec![waiting_conversation("c1"), waiting_conversation("c2")],
    )
    .await;

    engine.assign_seller("c1", "a").await.unwrap();
    engine.assign_seller("c1", "b").await.unwrap();

    // The transfer freed a's only slot; a new conversation can take it.
    engine.assign_seller("c2", "a").await.unwrap();
}

#[tokio::test]
async fn reassigning_the_current_seller_does_not_double_reserve() {
    let engine = engine(
        vec![seller("a", 8.0, 0, 2)],
        vec![waiting_conversation("c1"), waiting_conversation("c2")],
    )
    .await;

    engine.assign_seller("c1", "a").await.unwrap();
    engine.assign_seller("c1", "a").await.unwrap();

    // One slot is held, not two: unassigning once frees enough capacity
    // for two fresh assignments.
    engine.unassign_seller("c1").await.unwrap();
    engine.assign_seller("c1", "a").await.unwrap();
    engine.assign_seller("c2", "a").await.unwrap();
}

#[tokio::test]
async fn scoring_sees_tracked_load_not_registry_snapshot() {
    // One free slot out of two: after one assignment the tier drops and
    // the availability component shrinks, even though the registry still
    // reports current_clients = 0.
    let engine = engine(
        vec![seller("a", 8.0, 0, 2)],
        vec![waiting_conversation("c1"), waiting_conversation("c2")],
    )
    .await;

    let before = engine.get_recommendations("c2").await.unwrap();
    engine.assign_seller("c1", "a").await.unwrap();
    let after = engine.get_recommendations("c2").await.unwrap();
    assert!(after[0].score < before[0].score);
}

#[tokio::test]
async fn threshold_update_applies_and_validates() {
    let engine = engine(vec![seller("a", 8.0, 0, 2)], vec![]).await;

    engine
        .configure_alert_thresholds(AlertThresholdsUpdate {
            strikes_before_escalation: Some(5),
            cooldown_ticks: Some(6),
            ..Default::default()
        })
        .await
        .unwrap();
    let cfg = engine.shared_config().current().await;
    assert_eq!(cfg.thresholds.strikes_before_escalation, 5);
    assert_eq!(cfg.thresholds.cooldown_ticks, 6);

    // medio >= baixo is rejected and nothing changes.
    let err = engine
        .configure_alert_thresholds(AlertThresholdsUpdate {
            quality_medium_threshold: Some(9.5),
            ..Default::default()
        })
        .await;
    assert!(matches!(err, Err(EngineError::InvalidConfig(_))));
    let cfg = engine.shared_config().current().await;
    assert_eq!(cfg.thresholds.quality_medium_threshold, 6.0);
}

#[tokio::test]
async fn acknowledge_without_open_escalation_is_an_error() {
    let engine = engine(vec![], vec![waiting_conversation("c1")]).await;
    assert!(matches!(
        engine.acknowledge_escalation("c1").await,
        Err(EngineError::NoOpenEscalation(_))
    ));
}
