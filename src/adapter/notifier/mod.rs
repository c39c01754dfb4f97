//! Notification sink adapters.
//!
//! Delivery transport (WhatsApp, push, e-mail) lives outside the engine;
//! everything behind this trait. `TracingSink` is the dev default,
//! `ChannelSink` pushes into an mpsc consumed by the dashboard's
//! notification center and doubles as the test sink.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::domain::{model::Recipient, DeliveryError};

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<(), DeliveryError>;
}

/// Logs every notification at info level. Used by the dev harness.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<(), DeliveryError> {
        info!(
            level = recipient.level,
            role = %recipient.role,
            contact = %recipient.contact,
            message,
            "escalation notification"
        );
        Ok(())
    }
}

/// Pushed notification as seen by the dashboard side.
#[derive(Debug, Clone)]
pub struct OutboundNotification {
    pub recipient: Recipient,
    pub message: String,
}

/// Forwards notifications into an unbounded channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OutboundNotification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<(), DeliveryError> {
        self.tx
            .send(OutboundNotification {
                recipient: recipient.clone(),
                message: message.to_string(),
            })
            .map_err(|_| DeliveryError {
                recipient: recipient.contact.clone(),
                reason: "notification channel closed".to_string(),
            })
    }
}
