//! Seller-conversation matching and escalation monitoring engine.
//!
//! Two independent flows share this crate:
//! - on-demand ranking: score every eligible seller against a conversation
//!   and return the top candidates with human-readable reasons;
//! - continuous monitoring: a scheduler-driven quality monitor over active
//!   seller conversations that raises tiered escalations when quality
//!   stays degraded without seller action.
//!
//! Persistence, message transport and notification delivery are external
//! collaborators behind traits (`SellerRegistry`, `ConversationStore`,
//! `NotificationSink`).

pub mod adapter;
pub mod config;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod telemetry;

pub use config::{AlertThresholdsUpdate, EngineConfig, SharedEngineConfig};
pub use domain::{
    model::{
        AvailabilityTier, Conversation, ConversationStatus, Escalation, EscalationEvent,
        EscalationStatus, LeadTemperature, MatchResult, QualityAssessment, Recipient,
        ResolutionKind, RiskLevel, Seller, SellerStatus,
    },
    DeliveryError, EngineError, EngineResult,
};
pub use engine::{MatchingEngine, MatchingEngineBuilder};
