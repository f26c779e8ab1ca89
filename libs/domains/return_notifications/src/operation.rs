//! Entry point of the return-status notification workflow.

use crate::config::ReturnNotificationConfig;
use crate::context::{ContextBuilder, validate_event};
use crate::dispatcher::Dispatcher;
use crate::error::NotificationResult;
use crate::models::{DispatchOutcome, NotificationEvent};
use crate::providers::{MessagesClient, NotificationManager};
use crate::repository::{RecipientRepository, ReferenceRepository, StatusNames};
use crate::sanitizer::sanitize_payload;
use crate::templates::Localizer;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Processes one return-status event: sanitize, validate, build the
/// context, dispatch, report.
#[derive(Clone)]
pub struct ReturnOperation {
    references: Arc<dyn ReferenceRepository>,
    recipients: Arc<dyn RecipientRepository>,
    statuses: Arc<dyn StatusNames>,
    localizer: Arc<dyn Localizer>,
    messages: Arc<dyn MessagesClient>,
    notifications: Arc<dyn NotificationManager>,
    config: ReturnNotificationConfig,
}

impl ReturnOperation {
    pub fn new(
        references: Arc<dyn ReferenceRepository>,
        recipients: Arc<dyn RecipientRepository>,
        statuses: Arc<dyn StatusNames>,
        localizer: Arc<dyn Localizer>,
        messages: Arc<dyn MessagesClient>,
        notifications: Arc<dyn NotificationManager>,
    ) -> Self {
        Self {
            references,
            recipients,
            statuses,
            localizer,
            messages,
            notifications,
            config: ReturnNotificationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReturnNotificationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReturnNotificationConfig {
        &self.config
    }

    /// Run the workflow for one event payload.
    ///
    /// Fails only on request-level problems (missing type or reseller,
    /// unknown entities, empty required fields). Delivery problems are
    /// reported per channel in the returned outcome.
    #[instrument(skip_all)]
    pub async fn do_operation(&self, payload: &Value) -> NotificationResult<DispatchOutcome> {
        let raw = match payload {
            Value::Object(map) => map.clone(),
            other => {
                warn!(kind = %json_kind(other), "Event payload is not an object");
                Map::new()
            }
        };

        let data = sanitize_payload(&raw);
        let event = NotificationEvent::from_payload(&data);
        let notification_type = validate_event(&event)?;

        info!(
            reseller_id = event.reseller_id,
            complaint_id = event.complaint_id,
            notification_type = %notification_type,
            "Processing return notification"
        );

        let context = ContextBuilder::new(
            self.references.as_ref(),
            self.localizer.as_ref(),
            self.statuses.as_ref(),
        )
        .build(notification_type, &event)
        .await?;

        let outcome = Dispatcher::new(
            self.recipients.as_ref(),
            self.localizer.as_ref(),
            self.messages.as_ref(),
            self.notifications.as_ref(),
            &self.config,
        )
        .dispatch(event.reseller_id, &context, notification_type, event.differences)
        .await;

        Ok(outcome)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
