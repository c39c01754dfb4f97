pub mod app_config;

pub use app_config::{
    AlertThresholds, AlertThresholdsUpdate, EngineConfig, EscalationConfig, LoggingConfig,
    MonitorConfig, RankingConfig, SharedEngineConfig,
};
