use thiserror::Error;

/// Errors surfaced by the engine API. `CapacityExceeded` is a normal
/// business outcome the caller decides about (pick another candidate or
/// force-assign), never a fatal condition.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("seller {seller_id} is at capacity ({current}/{max})")]
    CapacityExceeded {
        seller_id: String,
        current: u32,
        max: u32,
    },

    #[error("unknown seller: {0}")]
    UnknownSeller(String),

    #[error("unknown conversation: {0}")]
    UnknownConversation(String),

    #[error("no open escalation for conversation {0}")]
    NoOpenEscalation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure delivering one escalation notification to one recipient.
/// Isolated per recipient: it is recorded on the escalation and logged,
/// and never fails the raise operation as a whole.
#[derive(Debug, Clone, Error)]
#[error("delivery to {recipient} failed: {reason}")]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}
