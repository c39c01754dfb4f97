//! Availability tracker.
//!
//! Owns the mutable per-seller load the registry snapshot cannot keep up
//! with between transfer flows. Writers (`reserve`/`release`) serialize per
//! seller through a tokio `Mutex`, so two concurrent transfers to the same
//! seller cannot both slip past the capacity check; different sellers
//! proceed in parallel. Reads (`snapshot`) go through an atomic and never
//! block, accepting slight staleness.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::domain::{
    model::{AvailabilityTier, Seller},
    EngineError, EngineResult,
};

struct SellerSlot {
    max_clients: u32,
    current: AtomicU32,
    /// Serializes reserve/release for this seller only.
    write_lock: Mutex<()>,
}

/// Non-blocking view of one seller's load.
#[derive(Debug, Clone, Copy)]
pub struct LoadSnapshot {
    pub current_clients: u32,
    pub max_clients: u32,
}

impl LoadSnapshot {
    pub fn tier(&self) -> AvailabilityTier {
        if self.max_clients == 0 {
            return AvailabilityTier::Baixa;
        }
        let rate =
            (1.0 - self.current_clients as f64 / self.max_clients as f64).clamp(0.0, 1.0);
        AvailabilityTier::from_rate(rate)
    }
}

#[derive(Default)]
pub struct AvailabilityTracker {
    slots: RwLock<HashMap<String, Arc<SellerSlot>>>,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a slot exists for the seller, seeding the current load
    /// from the registry snapshot on first sight. An existing slot keeps
    /// its tracked load (the tracker is authoritative once seeded) but
    /// picks up capacity changes.
    pub async fn register(&self, seller: &Seller) {
        let mut slots = self.slots.write().await;
        let existing = slots
            .get(&seller.id)
            .map(|slot| (slot.max_clients, slot.current.load(Ordering::Relaxed)));
        let seeded_current = match existing {
            Some((max, _)) if max == seller.max_concurrent_clients => return,
            Some((_, tracked)) => tracked,
            None => seller.current_clients,
        };
        slots.insert(
            seller.id.clone(),
            Arc::new(SellerSlot {
                max_clients: seller.max_concurrent_clients,
                current: AtomicU32::new(seeded_current),
                write_lock: Mutex::new(()),
            }),
        );
    }

    async fn slot(&self, seller_id: &str) -> EngineResult<Arc<SellerSlot>> {
        self.slots
            .read()
            .await
            .get(seller_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSeller(seller_id.to_string()))
    }

    /// Claim one client slot. Fails with `CapacityExceeded` when the seller
    /// is full; the caller decides whether that is final (the transfer UI
    /// may still force-assign an over-capacity seller).
    pub async fn reserve(&self, seller_id: &str) -> EngineResult<u32> {
        let slot = self.slot(seller_id).await?;
        let _guard = slot.write_lock.lock().await;
        let current = slot.current.load(Ordering::Acquire);
        if current >= slot.max_clients {
            return Err(EngineError::CapacityExceeded {
                seller_id: seller_id.to_string(),
                current,
                max: slot.max_clients,
            });
        }
        let next = current + 1;
        slot.current.store(next, Ordering::Release);
        debug!(seller_id, current = next, max = slot.max_clients, "reserved slot");
        Ok(next)
    }

    /// Release one client slot, floored at zero. Unknown sellers are a
    /// no-op: release may race with registry removal.
    pub async fn release(&self, seller_id: &str) -> u32 {
        let Ok(slot) = self.slot(seller_id).await else {
            return 0;
        };
        let _guard = slot.write_lock.lock().await;
        let current = slot.current.load(Ordering::Acquire);
        let next = current.saturating_sub(1);
        slot.current.store(next, Ordering::Release);
        debug!(seller_id, current = next, "released slot");
        next
    }

    /// Non-blocking read of the tracked load; may be slightly stale with
    /// respect to an in-flight reserve.
    pub async fn snapshot(&self, seller_id: &str) -> Option<LoadSnapshot> {
        let slots = self.slots.read().await;
        slots.get(seller_id).map(|slot| LoadSnapshot {
            current_clients: slot.current.load(Ordering::Relaxed),
            max_clients: slot.max_clients,
        })
    }

    /// Overwrite each snapshot's `current_clients` with the tracked value,
    /// so scoring sees assignments the registry has not caught up with.
    pub async fn overlay(&self, sellers: &mut [Seller]) {
        let slots = self.slots.read().await;
        for seller in sellers.iter_mut() {
            if let Some(slot) = slots.get(&seller.id) {
                seller.current_clients = slot.current.load(Ordering::Relaxed);
            }
        }
    }
}
