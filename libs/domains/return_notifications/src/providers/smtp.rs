//! SMTP email transport using lettre.

use super::{EmailMessage, EventMetadata, MessagesClient, NotificationEventKind};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, error, info};

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username (optional for dev servers like Mailpit).
    pub username: Option<String>,
    /// SMTP password (optional for dev servers like Mailpit).
    pub password: Option<String>,
    /// Whether to use TLS (false for local dev servers).
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Create a new SMTP configuration without TLS or credentials.
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            username: None,
            password: None,
            use_tls: false,
        }
    }

    /// Read `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD` and
    /// `SMTP_USE_TLS`. Defaults target a local Mailpit on port 1025.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1025),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: std::env::var("SMTP_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Builder method to set TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Builder method to set credentials.
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }
}

/// Sends each message of a batch over SMTP.
pub struct SmtpMessagesClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl SmtpMessagesClient {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { transport, config })
    }

    fn build_transport(config: &SmtpConfig) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
            _ => None,
        };

        let transport = if config.use_tls {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
                .port(config.port);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            builder.build()
        } else {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            builder.build()
        };

        Ok(transport)
    }

    fn build_message(email: &EmailMessage) -> NotificationResult<Message> {
        let from: Mailbox = email.from.parse().map_err(|e| {
            NotificationError::Provider(format!("Invalid from address '{}': {}", email.from, e))
        })?;
        let to: Mailbox = email.to.parse().map_err(|e| {
            NotificationError::Provider(format!("Invalid to address '{}': {}", email.to, e))
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;

        Ok(message)
    }
}

#[async_trait]
impl MessagesClient for SmtpMessagesClient {
    async fn send_messages(
        &self,
        messages: &[EmailMessage],
        reseller_id: i64,
        event: NotificationEventKind,
        metadata: EventMetadata,
    ) -> NotificationResult<()> {
        for email in messages {
            debug!(
                to = %email.to,
                subject = %email.subject,
                host = %self.config.host,
                port = %self.config.port,
                reseller_id = %reseller_id,
                event = %event,
                "Sending email via SMTP"
            );

            let message = Self::build_message(email)?;

            let response = self.transport.send(message).await.map_err(|e| {
                error!(to = %email.to, error = %e, "Failed to send email via SMTP");
                NotificationError::Provider(format!("SMTP send failed: {}", e))
            })?;

            info!(
                to = %email.to,
                reseller_id = %reseller_id,
                event = %event,
                client_id = ?metadata.client_id,
                status_code = ?metadata.status_code,
                smtp_code = %response.code(),
                "Email sent successfully via SMTP"
            );
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(from: &str, to: &str) -> EmailMessage {
        EmailMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Goods return C-1".to_string(),
            body: "Body".to_string(),
        }
    }

    #[test]
    fn test_smtp_config_from_env_defaults() {
        temp_env::with_vars_unset(["SMTP_HOST", "SMTP_PORT", "SMTP_USE_TLS"], || {
            let config = SmtpConfig::from_env();
            assert_eq!(config.host, "localhost");
            assert_eq!(config.port, 1025);
            assert!(!config.use_tls);
        });
    }

    #[test]
    fn test_smtp_config_from_env_values() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("mail.example.com")),
                ("SMTP_PORT", Some("587")),
                ("SMTP_USE_TLS", Some("1")),
            ],
            || {
                let config = SmtpConfig::from_env();
                assert_eq!(config.host, "mail.example.com");
                assert_eq!(config.port, 587);
                assert!(config.use_tls);
            },
        );
    }

    #[test]
    fn test_smtp_config_builders() {
        let config = SmtpConfig::new("smtp.example.com".to_string(), 587)
            .with_tls(true)
            .with_credentials("user".to_string(), "pass".to_string());

        assert!(config.use_tls);
        assert_eq!(config.username, Some("user".to_string()));
        assert_eq!(config.password, Some("pass".to_string()));
    }

    #[test]
    fn test_build_message() {
        let message = SmtpMessagesClient::build_message(&email("returns@north.test", "desk@north.test"));
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let result = SmtpMessagesClient::build_message(&email("returns@north.test", "not an address"));
        assert!(matches!(result, Err(NotificationError::Provider(_))));
    }
}
