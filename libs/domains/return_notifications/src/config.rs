//! Configuration of the return-notification workflow.

use crate::templates::{
    CLIENT_EMAIL_BODY, CLIENT_EMAIL_SUBJECT, EMPLOYEE_EMAIL_BODY, EMPLOYEE_EMAIL_SUBJECT,
};

/// How channel sends are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// All channels run at once and are joined before aggregation.
    Concurrent,
    /// Channels run one after another.
    Sequential,
}

/// Configuration for the return-notification workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnNotificationConfig {
    /// Permit employees need to receive return notices.
    pub permission_key: String,
    /// Template key of the employee email subject.
    pub employee_subject_key: String,
    /// Template key of the employee email body.
    pub employee_body_key: String,
    /// Template key of the client email subject.
    pub client_subject_key: String,
    /// Template key of the client email body.
    pub client_body_key: String,
    pub dispatch_mode: DispatchMode,
}

impl Default for ReturnNotificationConfig {
    fn default() -> Self {
        Self {
            permission_key: "tsGoodsReturn".to_string(),
            employee_subject_key: EMPLOYEE_EMAIL_SUBJECT.to_string(),
            employee_body_key: EMPLOYEE_EMAIL_BODY.to_string(),
            client_subject_key: CLIENT_EMAIL_SUBJECT.to_string(),
            client_body_key: CLIENT_EMAIL_BODY.to_string(),
            dispatch_mode: DispatchMode::Concurrent,
        }
    }
}

impl ReturnNotificationConfig {
    /// Defaults overridden by `RETURNS_PERMISSION_KEY` and
    /// `RETURNS_DISPATCH_SEQUENTIAL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            permission_key: std::env::var("RETURNS_PERMISSION_KEY")
                .unwrap_or(defaults.permission_key),
            dispatch_mode: match std::env::var("RETURNS_DISPATCH_SEQUENTIAL") {
                Ok(v) if v == "true" || v == "1" => DispatchMode::Sequential,
                _ => DispatchMode::Concurrent,
            },
            ..defaults
        }
    }

    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = mode;
        self
    }
}
