use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk classification of a monitored seller-client conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Baixo,
    Medio,
    Alto,
}

impl RiskLevel {
    /// Classify a 0–10 quality score against configurable cut-offs.
    /// Defaults: score >= 8 baixo, 6 <= score < 8 medio, below 6 alto.
    pub fn classify(score: f64, baixo_min: f64, medio_min: f64) -> Self {
        if score >= baixo_min {
            RiskLevel::Baixo
        } else if score >= medio_min {
            RiskLevel::Medio
        } else {
            RiskLevel::Alto
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Baixo => write!(f, "baixo"),
            RiskLevel::Medio => write!(f, "médio"),
            RiskLevel::Alto => write!(f, "alto"),
        }
    }
}

/// Latest quality snapshot for one monitored conversation. Overwritten on
/// every monitor tick; no history is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub conversation_id: String,
    pub seller_id: String,
    /// 0–10 running health score (the monitor clamps it into [3, 10]).
    pub score: f64,
    pub risk_level: RiskLevel,
    /// Incremented on every risk-level change since monitoring began.
    pub alerts_raised: u32,
    pub last_evaluated_at: DateTime<Utc>,
}
