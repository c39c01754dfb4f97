use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse bucket derived from a seller's spare capacity ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityTier {
    Alta,
    Media,
    Baixa,
}

impl AvailabilityTier {
    /// Tier from spare-capacity ratio: >0.7 alta, 0.4–0.7 média, else baixa.
    pub fn from_rate(rate: f64) -> Self {
        if rate > 0.7 {
            AvailabilityTier::Alta
        } else if rate >= 0.4 {
            AvailabilityTier::Media
        } else {
            AvailabilityTier::Baixa
        }
    }
}

impl fmt::Display for AvailabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityTier::Alta => write!(f, "alta"),
            AvailabilityTier::Media => write!(f, "média"),
            AvailabilityTier::Baixa => write!(f, "baixa"),
        }
    }
}

/// Result of scoring one seller against one conversation. Ephemeral:
/// computed on demand and cached at most briefly, never authoritative.
///
/// `score` is the rounded sum of the weighted components. The weights sum
/// to 100 but the hot-lead bonus is applied on top without re-clamping, so
/// values above 100 are legitimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub seller_id: String,
    pub conversation_id: String,
    pub score: u32,
    /// Human-readable justifications in the order the factors were scored.
    pub reasons: Vec<String>,
    pub availability_tier: AvailabilityTier,
}
