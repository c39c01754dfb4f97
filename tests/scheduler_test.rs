//! Monitor scheduler lifecycle: manual trigger and graceful shutdown.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::Utc;

use vendas_engine::{
    adapter::notifier::ChannelSink,
    repository::{InMemoryConversationStore, InMemorySellerRegistry},
    scheduler::{MonitorScheduler, MonitorSchedulerConfig},
    service::QualitySignal,
    Conversation, ConversationStatus, EngineConfig, LeadTemperature, MatchingEngineBuilder,
    Seller, SellerStatus,
};

struct ScriptedSignal {
    scripts: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl QualitySignal for ScriptedSignal {
    fn sample(&self, conversation: &Conversation, previous: f64) -> f64 {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&conversation.id)
            .and_then(|script| script.pop_front())
            .unwrap_or(previous)
    }
}

#[tokio::test(start_paused = true)]
async fn manual_trigger_runs_a_tick_and_shutdown_joins() {
    let registry = InMemorySellerRegistry::seed(vec![Seller {
        id: "v1".to_string(),
        name: "Vendedor v1".to_string(),
        specialties: Default::default(),
        performance_score: 8.0,
        current_clients: 1,
        max_concurrent_clients: 5,
        response_time_avg_seconds: 60,
        status: SellerStatus::Active,
    }])
    .await;
    let now = Utc::now();
    let store = InMemoryConversationStore::seed(vec![Conversation {
        id: "c1".to_string(),
        client_name: "Cliente".to_string(),
        client_phone: "+5511999990000".to_string(),
        lead_temperature: LeadTemperature::Warm,
        keywords: Default::default(),
        assigned_seller_id: Some("v1".to_string()),
        status: ConversationStatus::Seller,
        started_at: now,
        last_activity_at: now,
    }])
    .await;

    let (sink, _rx) = ChannelSink::new();
    let signal = ScriptedSignal {
        scripts: Mutex::new(HashMap::from([(
            "c1".to_string(),
            VecDeque::from([5.5]),
        )])),
    };
    let engine = MatchingEngineBuilder::new(registry, store, Arc::new(sink), EngineConfig::default())
        .with_quality_signal(Arc::new(signal))
        .build()
        .await;

    // Interval far in the future: only manual triggers run ticks.
    let handle = MonitorScheduler::new(
        engine.quality_monitor(),
        MonitorSchedulerConfig {
            tick_interval: Duration::from_secs(3600),
            ..Default::default()
        },
    )
    .start();

    handle.trigger_manual().unwrap();
    // Paused clock: this sleep just yields until the triggered tick ran.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let assessment = engine.quality_monitor().assessment("c1").await.unwrap();
    assert_eq!(assessment.score, 5.5);

    handle.shutdown().await.unwrap();
}
