//! Human-readable description of what changed in a return complaint.

use crate::models::NotificationType;
use crate::repository::StatusNames;
use crate::templates::{Localizer, NEW_POSITION_ADDED, POSITION_STATUS_CHANGED};
use serde_json::{Value, json};

/// Describe a notification for the reseller's locale.
///
/// New positions get a fixed notice; status changes name both statuses.
/// Any other type has no description.
pub fn describe_differences(
    localizer: &dyn Localizer,
    statuses: &dyn StatusNames,
    notification_type: NotificationType,
    reseller_id: i64,
    from: i64,
    to: i64,
) -> String {
    match notification_type {
        NotificationType::New => localizer.translate(NEW_POSITION_ADDED, &Value::Null, reseller_id),
        NotificationType::Change => {
            let params = json!({
                "FROM": statuses.status_name(from),
                "TO": statuses.status_name(to),
            });
            localizer.translate(POSITION_STATUS_CHANGED, &params, reseller_id)
        }
        NotificationType::Other(_) => String::new(),
    }
}
