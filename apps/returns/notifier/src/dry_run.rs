//! Transports that log instead of delivering.

use async_trait::async_trait;
use domain_return_notifications::{
    DeliveryReport, EmailMessage, EventMetadata, MessagesClient, NotificationContext,
    NotificationEventKind, NotificationManager, NotificationResult,
};
use tracing::info;

/// Logs every email it is asked to send.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMessagesClient;

#[async_trait]
impl MessagesClient for LoggingMessagesClient {
    async fn send_messages(
        &self,
        messages: &[EmailMessage],
        reseller_id: i64,
        event: NotificationEventKind,
        metadata: EventMetadata,
    ) -> NotificationResult<()> {
        for message in messages {
            info!(
                reseller_id = reseller_id,
                event = %event,
                client_id = ?metadata.client_id,
                status_code = ?metadata.status_code,
                from = %message.from,
                to = %message.to,
                subject = %message.subject,
                "[dry-run] email"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "DryRunEmail"
    }
}

/// Logs every SMS request and reports it as sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotificationManager;

#[async_trait]
impl NotificationManager for LoggingNotificationManager {
    async fn send(
        &self,
        reseller_id: i64,
        client_id: i64,
        event: NotificationEventKind,
        status_code: i64,
        context: &NotificationContext,
    ) -> NotificationResult<DeliveryReport> {
        info!(
            reseller_id = reseller_id,
            client_id = client_id,
            event = %event,
            status_code = status_code,
            phone = %context.client_mobile,
            "[dry-run] sms"
        );
        Ok(DeliveryReport::sent())
    }

    fn name(&self) -> &'static str {
        "DryRunSms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_transports_always_succeed() {
        let message = EmailMessage {
            from: "returns@north.test".to_string(),
            to: "desk@north.test".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        LoggingMessagesClient
            .send_messages(
                &[message],
                1,
                NotificationEventKind::ChangeReturnStatus,
                EventMetadata::default(),
            )
            .await
            .unwrap();

        let report = LoggingNotificationManager
            .send(
                1,
                7,
                NotificationEventKind::ChangeReturnStatus,
                5,
                &NotificationContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(report, DeliveryReport::sent());
    }
}
