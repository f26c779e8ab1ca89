//! Return Notifications Domain
//!
//! Reacts to status changes of goods-return complaints by notifying the
//! reseller's employees and the client over email and SMS.
//!
//! # Flow
//!
//! ```text
//! ┌─────────────────┐
//! │  Event payload  │  ← raw key/value map
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │    Sanitizer    │  ← trim, escape markup, strip tags
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ ContextBuilder  │  ← validate, resolve entities, differences text
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Dispatcher    │  ← employee email, client email, client SMS
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ DispatchOutcome │  ← per-channel report
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_return_notifications::{
//!     InMemoryDirectory, ReturnOperation, TemplateCatalog,
//!     providers::{HttpNotificationManager, SmtpMessagesClient, SmtpConfig},
//! };
//!
//! let directory = Arc::new(InMemoryDirectory::from_path("directory.json")?);
//! let operation = ReturnOperation::new(
//!     directory.clone(),
//!     directory.clone(),
//!     directory,
//!     Arc::new(TemplateCatalog::new()?),
//!     Arc::new(SmtpMessagesClient::new(SmtpConfig::from_env())?),
//!     Arc::new(HttpNotificationManager::from_env()?),
//! );
//!
//! let outcome = operation.do_operation(&payload).await?;
//! ```

pub mod config;
pub mod context;
pub mod differences;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod operation;
pub mod outcome;
pub mod providers;
pub mod repository;
pub mod sanitizer;
pub mod templates;

// Re-export commonly used types
pub use config::{DispatchMode, ReturnNotificationConfig};
pub use context::ContextBuilder;
pub use directory::InMemoryDirectory;
pub use dispatcher::Dispatcher;
pub use error::{ContextField, EntityKind, NotificationError, NotificationResult};
pub use models::{
    Client, Differences, DispatchOutcome, Employee, NotificationContext, NotificationEvent,
    NotificationType, Reseller, SmsOutcome,
};
pub use operation::ReturnOperation;
pub use providers::{
    DeliveryReport, EmailMessage, EventMetadata, MessagesClient, NotificationEventKind,
    NotificationManager,
};
pub use repository::{RecipientRepository, ReferenceRepository, StatusNames};
pub use templates::{Localizer, TemplateCatalog};
