//! HTTP SMS gateway implementation of the notification manager.

use super::{DeliveryReport, NotificationEventKind, NotificationManager};
use crate::error::{NotificationError, NotificationResult};
use crate::models::NotificationContext;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// SMS gateway configuration.
#[derive(Debug, Clone)]
pub struct SmsGatewayConfig {
    /// Base URL of the gateway API.
    pub api_url: String,
    /// Bearer token, if the gateway requires one.
    pub api_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SmsGatewayConfig {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            api_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> NotificationResult<Self> {
        let api_url = std::env::var("SMS_GATEWAY_URL")
            .map_err(|_| NotificationError::Config("SMS_GATEWAY_URL not set".to_string()))?;
        let timeout = std::env::var("SMS_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Ok(Self {
            api_url,
            api_token: std::env::var("SMS_GATEWAY_TOKEN").ok(),
            timeout,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    reseller_id: i64,
    client_id: i64,
    event: NotificationEventKind,
    status_code: i64,
    phone: &'a str,
    context: &'a NotificationContext,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts client notifications to an HTTP SMS gateway.
pub struct HttpNotificationManager {
    config: SmsGatewayConfig,
    client: Client,
}

impl HttpNotificationManager {
    pub fn new(config: SmsGatewayConfig) -> NotificationResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> NotificationResult<Self> {
        Self::new(SmsGatewayConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/notifications", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NotificationManager for HttpNotificationManager {
    async fn send(
        &self,
        reseller_id: i64,
        client_id: i64,
        event: NotificationEventKind,
        status_code: i64,
        context: &NotificationContext,
    ) -> NotificationResult<DeliveryReport> {
        let request = SendRequest {
            reseller_id,
            client_id,
            event,
            status_code,
            phone: &context.client_mobile,
            context,
        };

        debug!(
            reseller_id = %reseller_id,
            client_id = %client_id,
            status_code = %status_code,
            "Sending client notification via SMS gateway"
        );

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                client_id = %client_id,
                status = %status,
                error = %error_body,
                "SMS gateway rejected the request"
            );
            return Err(NotificationError::Provider(format!(
                "SMS gateway error ({}): {}",
                status, error_body
            )));
        }

        let body: SendResponse = response.json().await?;
        info!(
            client_id = %client_id,
            success = body.success,
            error = ?body.error,
            "SMS gateway answered"
        );

        Ok(DeliveryReport {
            success: body.success,
            error: body.error.filter(|e| !e.is_empty()),
        })
    }

    fn name(&self) -> &'static str {
        "SmsGateway"
    }
}
