//! Error types for the return-notification domain.

use std::fmt;
use thiserror::Error;

/// Result type for return-notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Reference entities that must resolve before a notification can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Seller,
    Creator,
    Expert,
    Client,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Seller => write!(f, "Seller"),
            EntityKind::Creator => write!(f, "Creator"),
            EntityKind::Expert => write!(f, "Expert"),
            EntityKind::Client => write!(f, "Client"),
        }
    }
}

/// Required fields of the notification context, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    ComplaintId,
    ComplaintNumber,
    CreatorId,
    CreatorName,
    ExpertId,
    ExpertName,
    ClientId,
    ConsumptionId,
    ConsumptionNumber,
    AgreementNumber,
    Date,
}

impl ContextField {
    /// Template key under which the field is exposed to message templates.
    pub fn key(&self) -> &'static str {
        match self {
            ContextField::ComplaintId => "COMPLAINT_ID",
            ContextField::ComplaintNumber => "COMPLAINT_NUMBER",
            ContextField::CreatorId => "CREATOR_ID",
            ContextField::CreatorName => "CREATOR_NAME",
            ContextField::ExpertId => "EXPERT_ID",
            ContextField::ExpertName => "EXPERT_NAME",
            ContextField::ClientId => "CLIENT_ID",
            ContextField::ConsumptionId => "CONSUMPTION_ID",
            ContextField::ConsumptionNumber => "CONSUMPTION_NUMBER",
            ContextField::AgreementNumber => "AGREEMENT_NUMBER",
            ContextField::Date => "DATE",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors that can occur in the return-notification domain.
///
/// The first three variants are request-level rejections. The remaining
/// ones are raised by transport implementations and never escape
/// [`ReturnOperation`](crate::ReturnOperation): the dispatcher records them
/// in the outcome instead.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// A mandatory request field is zero or absent.
    #[error("Empty {0}")]
    InvalidInput(&'static str),

    /// A referenced entity does not exist.
    #[error("{0} not found!")]
    EntityNotFound(EntityKind),

    /// A required context field resolved empty.
    #[error("Template Data ({0}) is empty!")]
    MissingTemplateField(ContextField),

    /// Transport (SMTP, SMS gateway) error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotificationError {
    /// Whether the error is caused by the request itself rather than by
    /// infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NotificationError::InvalidInput(_)
                | NotificationError::EntityNotFound(_)
                | NotificationError::MissingTemplateField(_)
        )
    }

    /// HTTP-style status classification for callers that surface one.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Provider(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotificationError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotificationError::Provider(format!("SMTP error: {}", err))
    }
}

impl From<lettre::error::Error> for NotificationError {
    fn from(err: lettre::error::Error) -> Self {
        NotificationError::Provider(format!("Failed to build email message: {}", err))
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for NotificationError {
    fn from(err: std::io::Error) -> Self {
        NotificationError::Internal(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_client_errors() {
        assert!(NotificationError::InvalidInput("resellerId").is_client_error());
        assert!(NotificationError::EntityNotFound(EntityKind::Expert).is_client_error());
        assert!(NotificationError::MissingTemplateField(ContextField::Date).is_client_error());
        assert_eq!(NotificationError::InvalidInput("notificationType").status_code(), 400);
    }

    #[test]
    fn test_transport_errors_are_not_client_errors() {
        let err = NotificationError::Provider("connection refused".to_string());
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_error_messages_name_the_culprit() {
        assert_eq!(
            NotificationError::EntityNotFound(EntityKind::Seller).to_string(),
            "Seller not found!"
        );
        assert_eq!(
            NotificationError::MissingTemplateField(ContextField::ConsumptionNumber).to_string(),
            "Template Data (CONSUMPTION_NUMBER) is empty!"
        );
        assert_eq!(
            NotificationError::InvalidInput("resellerId").to_string(),
            "Empty resellerId"
        );
    }
}
