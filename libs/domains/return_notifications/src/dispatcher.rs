//! Fan-out of a notification context to the delivery channels.
//!
//! Three channels exist: employee email, client email and client SMS. Each
//! one first runs a guard that either yields what the channel needs or a
//! [`SkipReason`]. Skips and transport failures are recorded in the channel's
//! own outcome field and never abort the other channels.

use crate::config::{DispatchMode, ReturnNotificationConfig};
use crate::models::{Differences, DispatchOutcome, NotificationContext, NotificationType};
use crate::outcome::{PartialOutcome, PartialSms, aggregate};
use crate::providers::{
    EmailMessage, EventMetadata, MessagesClient, NotificationEventKind, NotificationManager,
};
use crate::repository::RecipientRepository;
use crate::templates::Localizer;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Why a channel did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The reseller has no sender address.
    NoSenderAddress,
    /// Nobody holds the return-notice permit.
    NoRecipients,
    /// The event is not a status change with a target status.
    NotAStatusChange,
    /// The client has no email address.
    NoClientEmail,
    /// The client has no mobile number.
    NoClientMobile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSenderAddress => write!(f, "no sender address"),
            SkipReason::NoRecipients => write!(f, "no permitted recipients"),
            SkipReason::NotAStatusChange => write!(f, "not a status change"),
            SkipReason::NoClientEmail => write!(f, "client has no email"),
            SkipReason::NoClientMobile => write!(f, "client has no mobile"),
        }
    }
}

/// Employee channel needs a sender and at least one recipient.
pub fn employee_email_guard<'a>(
    sender: Option<&'a str>,
    recipients: &[String],
) -> Result<&'a str, SkipReason> {
    let sender = sender
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::NoSenderAddress)?;
    if recipients.is_empty() {
        return Err(SkipReason::NoRecipients);
    }
    Ok(sender)
}

/// Client channels only run for status changes that name a target status.
pub fn status_change_guard(
    notification_type: NotificationType,
    differences: Option<Differences>,
) -> Result<i64, SkipReason> {
    match notification_type {
        NotificationType::Change => differences
            .and_then(|d| d.target_status())
            .ok_or(SkipReason::NotAStatusChange),
        _ => Err(SkipReason::NotAStatusChange),
    }
}

/// Client email needs a sender and the client's address.
pub fn client_email_guard<'a>(
    sender: Option<&'a str>,
    context: &'a NotificationContext,
) -> Result<(&'a str, &'a str), SkipReason> {
    let sender = sender
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::NoSenderAddress)?;
    if context.client_email.is_empty() {
        return Err(SkipReason::NoClientEmail);
    }
    Ok((sender, &context.client_email))
}

/// Client SMS needs the client's mobile number.
pub fn client_sms_guard(context: &NotificationContext) -> Result<&str, SkipReason> {
    if context.client_mobile.is_empty() {
        Err(SkipReason::NoClientMobile)
    } else {
        Ok(&context.client_mobile)
    }
}

/// Sends one notification over every eligible channel.
pub struct Dispatcher<'a> {
    recipients: &'a dyn RecipientRepository,
    localizer: &'a dyn Localizer,
    messages: &'a dyn MessagesClient,
    notifications: &'a dyn NotificationManager,
    config: &'a ReturnNotificationConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        recipients: &'a dyn RecipientRepository,
        localizer: &'a dyn Localizer,
        messages: &'a dyn MessagesClient,
        notifications: &'a dyn NotificationManager,
        config: &'a ReturnNotificationConfig,
    ) -> Self {
        Self {
            recipients,
            localizer,
            messages,
            notifications,
            config,
        }
    }

    /// Run all channels and return the aggregated report.
    #[instrument(skip_all, fields(reseller_id = reseller_id, complaint_id = context.complaint_id))]
    pub async fn dispatch(
        &self,
        reseller_id: i64,
        context: &NotificationContext,
        notification_type: NotificationType,
        differences: Option<Differences>,
    ) -> DispatchOutcome {
        let sender = self.recipients.sender_email(reseller_id).await;
        let params = match serde_json::to_value(context) {
            Ok(params) => params,
            Err(e) => {
                warn!(error = %e, "Failed to serialize notification context");
                Value::Null
            }
        };
        let target_status = status_change_guard(notification_type, differences);

        let employee = self.employee_email(reseller_id, sender.as_deref(), &params);
        let client_email =
            self.client_email(reseller_id, sender.as_deref(), context, &params, target_status);
        let client_sms = self.client_sms(reseller_id, context, target_status);

        let (employee_email, client_email, client_sms) = match self.config.dispatch_mode {
            DispatchMode::Concurrent => tokio::join!(employee, client_email, client_sms),
            DispatchMode::Sequential => (employee.await, client_email.await, client_sms.await),
        };

        let outcome = aggregate(PartialOutcome {
            employee_email,
            client_email,
            client_sms,
        });

        info!(
            employee_email = outcome.employee_email_sent,
            client_email = outcome.client_email_sent,
            client_sms = outcome.client_sms.is_sent,
            "Return notification dispatched"
        );

        outcome
    }

    /// One message per permitted employee. Marked sent when at least one
    /// message went out.
    async fn employee_email(
        &self,
        reseller_id: i64,
        sender: Option<&str>,
        params: &Value,
    ) -> Option<bool> {
        let recipients = self
            .recipients
            .emails_by_permit(reseller_id, &self.config.permission_key)
            .await;

        let sender = match employee_email_guard(sender, &recipients) {
            Ok(sender) => sender,
            Err(reason) => {
                debug!(channel = "employee_email", reason = %reason, "Channel skipped");
                return None;
            }
        };

        let subject = self
            .localizer
            .translate(&self.config.employee_subject_key, params, reseller_id);
        let body = self
            .localizer
            .translate(&self.config.employee_body_key, params, reseller_id);

        let mut delivered = 0usize;
        for recipient in &recipients {
            let message = EmailMessage {
                from: sender.to_string(),
                to: recipient.clone(),
                subject: subject.clone(),
                body: body.clone(),
            };
            match self
                .messages
                .send_messages(
                    &[message],
                    reseller_id,
                    NotificationEventKind::ChangeReturnStatus,
                    EventMetadata::default(),
                )
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(channel = "employee_email", to = %recipient, error = %e, "Send failed")
                }
            }
        }

        info!(
            channel = "employee_email",
            recipients = recipients.len(),
            delivered = delivered,
            "Employee emails sent"
        );

        Some(delivered > 0)
    }

    async fn client_email(
        &self,
        reseller_id: i64,
        sender: Option<&str>,
        context: &NotificationContext,
        params: &Value,
        target_status: Result<i64, SkipReason>,
    ) -> Option<bool> {
        let guarded = target_status
            .and_then(|status| client_email_guard(sender, context).map(|addr| (status, addr)));
        let (status_code, (sender, client_email)) = match guarded {
            Ok(ready) => ready,
            Err(reason) => {
                debug!(channel = "client_email", reason = %reason, "Channel skipped");
                return None;
            }
        };

        let message = EmailMessage {
            from: sender.to_string(),
            to: client_email.to_string(),
            subject: self
                .localizer
                .translate(&self.config.client_subject_key, params, reseller_id),
            body: self
                .localizer
                .translate(&self.config.client_body_key, params, reseller_id),
        };
        let metadata = EventMetadata {
            client_id: Some(context.client_id),
            status_code: Some(status_code),
        };

        match self
            .messages
            .send_messages(
                &[message],
                reseller_id,
                NotificationEventKind::ChangeReturnStatus,
                metadata,
            )
            .await
        {
            Ok(()) => {
                info!(channel = "client_email", client_id = context.client_id, "Client email sent");
                Some(true)
            }
            Err(e) => {
                warn!(channel = "client_email", client_id = context.client_id, error = %e, "Send failed");
                Some(false)
            }
        }
    }

    async fn client_sms(
        &self,
        reseller_id: i64,
        context: &NotificationContext,
        target_status: Result<i64, SkipReason>,
    ) -> Option<PartialSms> {
        let guarded = target_status.and_then(|status| client_sms_guard(context).map(|_| status));
        let status_code = match guarded {
            Ok(status_code) => status_code,
            Err(reason) => {
                debug!(channel = "client_sms", reason = %reason, "Channel skipped");
                return None;
            }
        };

        let result = self
            .notifications
            .send(
                reseller_id,
                context.client_id,
                NotificationEventKind::ChangeReturnStatus,
                status_code,
                context,
            )
            .await;

        let sms = match result {
            Ok(report) => PartialSms {
                is_sent: Some(report.success),
                message: report.error.filter(|e| !e.is_empty()),
            },
            Err(e) => {
                warn!(channel = "client_sms", client_id = context.client_id, error = %e, "Send failed");
                PartialSms {
                    is_sent: Some(false),
                    message: Some(e.to_string()),
                }
            }
        };

        info!(
            channel = "client_sms",
            client_id = context.client_id,
            is_sent = ?sms.is_sent,
            "Client SMS attempted"
        );

        Some(sms)
    }
}
