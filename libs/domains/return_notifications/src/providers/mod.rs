//! Delivery transports.
//!
//! This module contains the [`MessagesClient`] (email) and
//! [`NotificationManager`] (client SMS) traits and their implementations.

mod sms_gateway;
mod smtp;

pub use sms_gateway::{HttpNotificationManager, SmsGatewayConfig};
pub use smtp::{SmtpConfig, SmtpMessagesClient};

use crate::error::NotificationResult;
use crate::models::NotificationContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business event a message is sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEventKind {
    /// The status of a goods return changed.
    ChangeReturnStatus,
}

impl fmt::Display for NotificationEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationEventKind::ChangeReturnStatus => write!(f, "change_return_status"),
        }
    }
}

/// One rendered email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Optional event data attached to a send call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Client the message concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    /// Status the complaint moved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
}

/// What the notification manager reports back for one send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Email transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagesClient: Send + Sync {
    /// Send a batch of emails on behalf of a reseller.
    async fn send_messages(
        &self,
        messages: &[EmailMessage],
        reseller_id: i64,
        event: NotificationEventKind,
        metadata: EventMetadata,
    ) -> NotificationResult<()>;

    /// Get the transport name for logging.
    fn name(&self) -> &'static str;
}

/// Client notification transport (SMS and similar managed channels).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationManager: Send + Sync {
    /// Notify a client about a status change.
    async fn send(
        &self,
        reseller_id: i64,
        client_id: i64,
        event: NotificationEventKind,
        status_code: i64,
        context: &NotificationContext,
    ) -> NotificationResult<DeliveryReport>;

    /// Get the transport name for logging.
    fn name(&self) -> &'static str;
}
