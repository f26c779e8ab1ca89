//! Data models for the return-notification domain.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Incoming event
// ============================================================================

/// Kind of return-complaint event being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// A new position was added to the complaint.
    New,
    /// The status of a position changed.
    Change,
    /// Any other non-zero code. Accepted, but produces no difference text
    /// and no client notifications.
    Other(i64),
}

impl NotificationType {
    /// Map a wire code to a type. Zero means "not provided".
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(NotificationType::New),
            2 => Some(NotificationType::Change),
            other => Some(NotificationType::Other(other)),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            NotificationType::New => 1,
            NotificationType::Change => 2,
            NotificationType::Other(code) => *code,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::New => write!(f, "new"),
            NotificationType::Change => write!(f, "change"),
            NotificationType::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// Status transition carried by the event. A zero code means "absent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Differences {
    pub from: i64,
    pub to: i64,
}

impl Differences {
    /// Both ends of the transition are known.
    pub fn is_complete(&self) -> bool {
        self.from != 0 && self.to != 0
    }

    /// Status the complaint moved to, if provided.
    pub fn target_status(&self) -> Option<i64> {
        (self.to != 0).then_some(self.to)
    }
}

/// Typed view over a sanitized event payload.
///
/// Scalars are coerced leniently: integers keep the leading sign and digits
/// of their string form (anything else is 0), strings take the textual form
/// of numbers. Missing keys coerce to 0 or the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationEvent {
    pub notification_type: i64,
    pub reseller_id: i64,
    pub complaint_id: i64,
    pub complaint_number: String,
    pub creator_id: i64,
    pub expert_id: i64,
    pub client_id: i64,
    pub consumption_id: i64,
    pub consumption_number: String,
    pub agreement_number: String,
    pub date: String,
    pub differences: Option<Differences>,
}

impl NotificationEvent {
    /// Read an event out of a (sanitized) payload object.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let int = |key: &str| payload.get(key).map(coerce_int).unwrap_or(0);
        let text = |key: &str| payload.get(key).map(coerce_string).unwrap_or_default();

        let differences = match payload.get("differences") {
            Some(Value::Object(diff)) => Some(Differences {
                from: diff.get("from").map(coerce_int).unwrap_or(0),
                to: diff.get("to").map(coerce_int).unwrap_or(0),
            }),
            _ => None,
        };

        Self {
            notification_type: int("notificationType"),
            reseller_id: int("resellerId"),
            complaint_id: int("complaintId"),
            complaint_number: text("complaintNumber"),
            creator_id: int("creatorId"),
            expert_id: int("expertId"),
            client_id: int("clientId"),
            consumption_id: int("consumptionId"),
            consumption_number: text("consumptionNumber"),
            agreement_number: text("agreementNumber"),
            date: text("date"),
            differences,
        }
    }

    /// Target status of the transition, if one was provided.
    pub fn target_status(&self) -> Option<i64> {
        self.differences.and_then(|d| d.target_status())
    }
}

/// Integer coercion used for id and status fields.
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// String coercion used for number-like text fields.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => String::new(),
    }
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

// ============================================================================
// Reference entities
// ============================================================================

/// A reseller (seller) owning the complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reseller {
    pub id: i64,
    pub name: String,
    /// Address outgoing emails are sent from.
    #[serde(default)]
    pub sender_email: Option<String>,
    /// Locale used for this reseller's messages.
    #[serde(default)]
    pub locale: Option<String>,
}

/// An employee acting as complaint creator or expert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

/// The client (contractor) who filed the return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    /// Raw name as registered.
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
}

impl Client {
    /// Full name when known, otherwise the raw name.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }
}

// ============================================================================
// Notification context
// ============================================================================

/// Flattened, validated data every channel renders its messages from.
///
/// Serializes with the upper-snake keys message templates refer to
/// (`COMPLAINT_ID`, `CLIENT_NAME`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NotificationContext {
    pub complaint_id: i64,
    pub complaint_number: String,
    pub creator_id: i64,
    pub creator_name: String,
    pub expert_id: i64,
    pub expert_name: String,
    pub client_id: i64,
    pub consumption_id: i64,
    pub consumption_number: String,
    pub agreement_number: String,
    pub date: String,
    pub differences: String,
    pub client_name: String,
    pub client_email: String,
    pub client_mobile: String,
}

// ============================================================================
// Outcome report
// ============================================================================

/// Result of the client SMS channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsOutcome {
    #[serde(rename = "isSent")]
    pub is_sent: bool,
    #[serde(rename = "message")]
    pub error_message: String,
}

/// Per-channel report returned by the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    #[serde(rename = "notificationEmployeeByEmail")]
    pub employee_email_sent: bool,
    #[serde(rename = "notificationClientByEmail")]
    pub client_email_sent: bool,
    #[serde(rename = "notificationClientBySms")]
    pub client_sms: SmsOutcome,
}
