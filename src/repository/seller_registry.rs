//! Seller registry abstraction.
//!
//! The registry is owned by the surrounding dashboard/backend; the engine
//! only reads snapshots from it. `InMemorySellerRegistry` backs tests and
//! the dev harness.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::model::Seller;

#[async_trait]
pub trait SellerRegistry: Send + Sync {
    /// Sellers with `status == active`, in no particular order.
    async fn list_active_sellers(&self) -> Vec<Seller>;

    async fn get(&self, seller_id: &str) -> Option<Seller>;
}

#[derive(Default)]
pub struct InMemorySellerRegistry {
    sellers: RwLock<HashMap<String, Seller>>,
}

impl InMemorySellerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, seller: Seller) {
        self.sellers.write().await.insert(seller.id.clone(), seller);
    }

    pub async fn seed(sellers: Vec<Seller>) -> Arc<Self> {
        let registry = Arc::new(Self::new());
        for seller in sellers {
            registry.upsert(seller).await;
        }
        registry
    }
}

#[async_trait]
impl SellerRegistry for InMemorySellerRegistry {
    async fn list_active_sellers(&self) -> Vec<Seller> {
        self.sellers
            .read()
            .await
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect()
    }

    async fn get(&self, seller_id: &str) -> Option<Seller> {
        self.sellers.read().await.get(seller_id).cloned()
    }
}
