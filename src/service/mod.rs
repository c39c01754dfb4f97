pub mod availability_tracker;
pub mod escalation_engine;
pub mod keyword_extractor;
pub mod match_scorer;
pub mod quality_monitor;
pub mod recommendation_ranker;

pub use availability_tracker::{AvailabilityTracker, LoadSnapshot};
pub use escalation_engine::{EscalationEngine, EscalationHandler};
pub use keyword_extractor::{CategoryKeywordExtractor, KeywordExtractor, StoredKeywordExtractor};
pub use match_scorer::score_match;
pub use quality_monitor::{DriftSignal, QualityMonitor, QualitySignal, TickSummary};
pub use recommendation_ranker::RecommendationRanker;
