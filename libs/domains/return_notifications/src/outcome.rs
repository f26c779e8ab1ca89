//! Normalization of per-channel results into the final report.

use crate::models::{DispatchOutcome, SmsOutcome};

/// Client SMS result as recorded by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSms {
    pub is_sent: Option<bool>,
    pub message: Option<String>,
}

/// Channel results as recorded by the dispatcher. `None` means the channel
/// did not run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialOutcome {
    pub employee_email: Option<bool>,
    pub client_email: Option<bool>,
    pub client_sms: Option<PartialSms>,
}

/// Fill every unset field with `false` or the empty string.
pub fn aggregate(partial: PartialOutcome) -> DispatchOutcome {
    let sms = partial.client_sms.unwrap_or_default();
    DispatchOutcome {
        employee_email_sent: partial.employee_email.unwrap_or(false),
        client_email_sent: partial.client_email.unwrap_or(false),
        client_sms: SmsOutcome {
            is_sent: sms.is_sent.unwrap_or(false),
            error_message: sms.message.unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_partial_yields_defaults() {
        assert_eq!(aggregate(PartialOutcome::default()), DispatchOutcome::default());
    }

    #[test]
    fn test_set_fields_are_kept() {
        let outcome = aggregate(PartialOutcome {
            employee_email: Some(true),
            client_email: None,
            client_sms: Some(PartialSms {
                is_sent: Some(false),
                message: Some("undeliverable".to_string()),
            }),
        });

        assert!(outcome.employee_email_sent);
        assert!(!outcome.client_email_sent);
        assert!(!outcome.client_sms.is_sent);
        assert_eq!(outcome.client_sms.error_message, "undeliverable");
    }

    #[test]
    fn test_sms_without_message() {
        let outcome = aggregate(PartialOutcome {
            client_sms: Some(PartialSms {
                is_sent: Some(true),
                message: None,
            }),
            ..Default::default()
        });
        assert!(outcome.client_sms.is_sent);
        assert_eq!(outcome.client_sms.error_message, "");
    }
}
