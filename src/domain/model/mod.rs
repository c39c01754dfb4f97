pub mod conversation;
pub mod escalation;
pub mod match_result;
pub mod quality;
pub mod seller;

pub use conversation::{Conversation, ConversationStatus, LeadTemperature};
pub use escalation::{Escalation, EscalationEvent, EscalationStatus, Recipient, ResolutionKind};
pub use match_result::{AvailabilityTier, MatchResult};
pub use quality::{QualityAssessment, RiskLevel};
pub use seller::{Seller, SellerStatus};
