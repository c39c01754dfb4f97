use std::sync::Arc;

use tokio::sync::Barrier;

use vendas_engine::{
    service::AvailabilityTracker, AvailabilityTier, EngineError, Seller, SellerStatus,
};

fn seller(id: &str, current: u32, max: u32) -> Seller {
    Seller {
        id: id.to_string(),
        name: format!("Vendedor {id}"),
        specialties: Default::default(),
        performance_score: 7.0,
        current_clients: current,
        max_concurrent_clients: max,
        response_time_avg_seconds: 120,
        status: SellerStatus::Active,
    }
}

#[tokio::test]
async fn concurrent_reservations_on_last_slot_admit_exactly_one() {
    let tracker = Arc::new(AvailabilityTracker::new());
    tracker.register(&seller("v1", 0, 1)).await;

    let barrier = Arc::new(Barrier::new(2));
    let mut tasks = Vec::new();
    for _ in 0..2 {
        let tracker = tracker.clone();
        let barrier = barrier.clone();
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            tracker.reserve("v1").await
        }));
    }

    let mut successes = 0;
    let mut capacity_errors = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(EngineError::CapacityExceeded { .. }) => capacity_errors += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(capacity_errors, 1);

    let snapshot = tracker.snapshot("v1").await.unwrap();
    assert_eq!(snapshot.current_clients, 1);
}

#[tokio::test]
async fn release_floors_at_zero() {
    let tracker = AvailabilityTracker::new();
    tracker.register(&seller("v1", 0, 3)).await;

    assert_eq!(tracker.release("v1").await, 0);
    assert_eq!(tracker.reserve("v1").await.unwrap(), 1);
    assert_eq!(tracker.release("v1").await, 0);
    assert_eq!(tracker.release("v1").await, 0);
}

#[tokio::test]
async fn reserve_on_unknown_seller_fails() {
    let tracker = AvailabilityTracker::new();
    assert!(matches!(
        tracker.reserve("ghost").await,
        Err(EngineError::UnknownSeller(_))
    ));
}

#[tokio::test]
async fn snapshot_tier_follows_tracked_load() {
    let tracker = AvailabilityTracker::new();
    tracker.register(&seller("v1", 0, 10)).await;
    assert_eq!(tracker.snapshot("v1").await.unwrap().tier(), AvailabilityTier::Alta);

    for _ in 0..5 {
        tracker.reserve("v1").await.unwrap();
    }
    // 5/10 busy -> spare rate 0.5 -> média
    assert_eq!(tracker.snapshot("v1").await.unwrap().tier(), AvailabilityTier::Media);

    for _ in 0..4 {
        tracker.reserve("v1").await.unwrap();
    }
    assert_eq!(tracker.snapshot("v1").await.unwrap().tier(), AvailabilityTier::Baixa);
}

#[tokio::test]
async fn registered_seller_keeps_tracked_load_across_reregistration() {
    let tracker = AvailabilityTracker::new();
    tracker.register(&seller("v1", 2, 5)).await;
    tracker.reserve("v1").await.unwrap();

    // Registry refresh with a stale current_clients must not clobber the
    // tracked value.
    tracker.register(&seller("v1", 2, 5)).await;
    assert_eq!(tracker.snapshot("v1").await.unwrap().current_clients, 3);
}
