//! Development harness for the matching/escalation engine.
//!
//! Seeds the in-memory registry and conversation store with the mock data
//! the dashboard ships with, starts the monitor scheduler with the drift
//! signal, prints a recommendation ranking, and then runs until ctrl-c,
//! logging escalation raises/resolves as conversations degrade.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use tokio::signal;
use tracing::info;

use vendas_engine::{
    adapter::notifier::TracingSink,
    config::SharedEngineConfig,
    repository::{InMemoryConversationStore, InMemorySellerRegistry},
    scheduler::{MonitorScheduler, MonitorSchedulerConfig},
    service::CategoryKeywordExtractor,
    telemetry, Conversation, ConversationStatus, LeadTemperature, MatchingEngineBuilder, Seller,
    SellerStatus,
};

fn mock_sellers() -> Vec<Seller> {
    let seller = |id: &str, name: &str, specialties: &[&str], perf: f64, cur, max, rt| Seller {
        id: id.to_string(),
        name: name.to_string(),
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        performance_score: perf,
        current_clients: cur,
        max_concurrent_clients: max,
        response_time_avg_seconds: rt,
        status: SellerStatus::Active,
    };
    vec![
        seller("v1", "Ana Souza", &["construção", "residencial"], 9.2, 3, 8, 45),
        seller("v2", "Bruno Lima", &["b2b", "energia"], 8.5, 6, 8, 120),
        seller("v3", "Carla Mendes", &["arquitetura"], 7.1, 1, 5, 200),
        seller("v4", "Diego Alves", &["energia", "b2b"], 6.0, 4, 4, 90),
    ]
}

fn mock_conversations() -> Vec<Conversation> {
    let now = Utc::now();
    let conv = |id: &str, name: &str, temp, keywords: &[&str], seller: Option<&str>| {
        Conversation {
            id: id.to_string(),
            client_name: name.to_string(),
            client_phone: format!("+5511 9{}", id),
            lead_temperature: temp,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            assigned_seller_id: seller.map(|s| s.to_string()),
            status: if seller.is_some() {
                ConversationStatus::Seller
            } else {
                ConversationStatus::Waiting
            },
            started_at: now,
            last_activity_at: now,
        }
    };
    vec![
        conv("c1", "Mariana Costa", LeadTemperature::Hot, &["obra", "casa"], None),
        conv("c2", "Construtora Delta", LeadTemperature::Warm, &["empresa", "solar"], Some("v2")),
        conv("c3", "Paulo Reis", LeadTemperature::Cold, &["planta"], Some("v3")),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = SharedEngineConfig::load_from_sources(&[PathBuf::from("config/default.toml")])?;
    let cfg = config.current().await;
    telemetry::init_tracing(cfg.logging.level.as_deref());

    let registry = InMemorySellerRegistry::seed(mock_sellers()).await;
    let store = InMemoryConversationStore::seed(mock_conversations()).await;

    let engine = MatchingEngineBuilder::new(
        registry.clone(),
        store.clone(),
        Arc::new(TracingSink),
        cfg.clone(),
    )
    .with_shared_config(config)
    .with_keyword_extractor(Arc::new(CategoryKeywordExtractor::with_default_categories()))
    .build()
    .await;

    // One ranking pass for the unassigned hot lead, like the transfer
    // dialog would request.
    for result in engine.get_recommendations("c1").await? {
        info!(
            seller_id = %result.seller_id,
            score = result.score,
            tier = %result.availability_tier,
            reasons = ?result.reasons,
            "recommendation"
        );
    }

    let scheduler = MonitorScheduler::new(
        engine.quality_monitor(),
        MonitorSchedulerConfig {
            tick_interval: Duration::from_secs(cfg.monitor.tick_interval_secs),
            ..Default::default()
        },
    );
    let handle = scheduler.start();

    info!("engine running, ctrl-c to stop");
    signal::ctrl_c().await?;
    info!("shutdown requested");
    handle.shutdown().await?;
    Ok(())
}
