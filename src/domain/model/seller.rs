use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Whether a seller participates in matching at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerStatus {
    Active,
    Inactive,
}

/// Read-only seller snapshot as exposed by the registry.
///
/// `current_clients <= max_concurrent_clients` is a soft constraint: scoring
/// penalizes overflow but the engine never rejects a snapshot that violates
/// it (force-assignments by supervisors produce exactly that state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
    /// Specialty tags, e.g. "construção", "b2b", "residencial".
    #[serde(default)]
    pub specialties: BTreeSet<String>,
    /// 0–10 rolling performance grade maintained by the registry.
    pub performance_score: f64,
    pub current_clients: u32,
    pub max_concurrent_clients: u32,
    pub response_time_avg_seconds: u32,
    pub status: SellerStatus,
}

impl Seller {
    pub fn is_active(&self) -> bool {
        self.status == SellerStatus::Active
    }

    /// Fraction of spare capacity, clamped to [0, 1].
    ///
    /// A seller with `max_concurrent_clients == 0` has rate 0 — never a
    /// division error, never an exclusion (that is a caller policy).
    pub fn availability_rate(&self) -> f64 {
        if self.max_concurrent_clients == 0 {
            return 0.0;
        }
        let rate = 1.0 - (self.current_clients as f64 / self.max_concurrent_clients as f64);
        rate.clamp(0.0, 1.0)
    }
}
