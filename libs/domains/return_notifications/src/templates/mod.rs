//! Localized message rendering.
//!
//! This module defines the [`Localizer`] seam and a Handlebars-based
//! implementation keeping one template set per locale.

use crate::error::{NotificationError, NotificationResult};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Template key of the employee email subject.
pub const EMPLOYEE_EMAIL_SUBJECT: &str = "complaintEmployeeEmailSubject";
/// Template key of the employee email body.
pub const EMPLOYEE_EMAIL_BODY: &str = "complaintEmployeeEmailBody";
/// Template key of the client email subject.
pub const CLIENT_EMAIL_SUBJECT: &str = "complaintClientEmailSubject";
/// Template key of the client email body.
pub const CLIENT_EMAIL_BODY: &str = "complaintClientEmailBody";
/// Difference text for a newly added position.
pub const NEW_POSITION_ADDED: &str = "NewPositionAdded";
/// Difference text for a status transition. Takes `FROM` and `TO`.
pub const POSITION_STATUS_CHANGED: &str = "PositionStatusHasChanged";

/// Renders a message identified by key, localized for a reseller.
///
/// Rendering never fails from the caller's point of view: a missing
/// template yields the key itself.
#[cfg_attr(test, mockall::automock)]
pub trait Localizer: Send + Sync {
    fn translate(&self, key: &str, params: &Value, reseller_id: i64) -> String;
}

/// Handlebars template catalog with per-reseller locale selection.
pub struct TemplateCatalog {
    handlebars: Handlebars<'static>,
    default_locale: String,
    reseller_locales: HashMap<i64, String>,
}

impl TemplateCatalog {
    /// Create a catalog with the built-in English templates registered.
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        // Inputs are sanitized before they reach the templates.
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut catalog = Self {
            handlebars,
            default_locale: "en".to_string(),
            reseller_locales: HashMap::new(),
        };

        for (key, template) in BUILTIN_EN {
            catalog.register("en", key, template)?;
        }

        Ok(catalog)
    }

    /// Locale used when a reseller has none or its locale lacks a key.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Pin a reseller to a locale.
    pub fn with_reseller_locale(mut self, reseller_id: i64, locale: impl Into<String>) -> Self {
        self.reseller_locales.insert(reseller_id, locale.into());
        self
    }

    /// Register (or replace) one template.
    pub fn register(&mut self, locale: &str, key: &str, template: &str) -> NotificationResult<()> {
        self.handlebars
            .register_template_string(&template_name(locale, key), template)
            .map_err(|e| {
                NotificationError::Config(format!(
                    "Failed to register template {}/{}: {}",
                    locale, key, e
                ))
            })
    }

    /// Register templates from a JSON document of the form
    /// `{ "<locale>": { "<key>": "<template>" } }`.
    pub fn register_json(&mut self, json: &str) -> NotificationResult<()> {
        let locales: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)?;
        for (locale, templates) in &locales {
            for (key, template) in templates {
                self.register(locale, key, template)?;
            }
            debug!(locale = %locale, templates = templates.len(), "Registered locale templates");
        }
        Ok(())
    }

    fn locale_for(&self, reseller_id: i64) -> &str {
        self.reseller_locales
            .get(&reseller_id)
            .map(String::as_str)
            .unwrap_or(&self.default_locale)
    }
}

impl Localizer for TemplateCatalog {
    fn translate(&self, key: &str, params: &Value, reseller_id: i64) -> String {
        let preferred = template_name(self.locale_for(reseller_id), key);
        let fallback = template_name(&self.default_locale, key);

        let name = if self.handlebars.has_template(&preferred) {
            preferred
        } else if self.handlebars.has_template(&fallback) {
            fallback
        } else {
            warn!(key = %key, reseller_id = %reseller_id, "No template registered for key");
            return key.to_string();
        };

        match self.handlebars.render(&name, params) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(template = %name, error = %e, "Template rendering failed");
                key.to_string()
            }
        }
    }
}

fn template_name(locale: &str, key: &str) -> String {
    format!("{}/{}", locale, key)
}

const BUILTIN_EN: [(&str, &str); 6] = [
    (NEW_POSITION_ADDED, "New position added"),
    (
        POSITION_STATUS_CHANGED,
        "Position status has changed from \"{{FROM}}\" to \"{{TO}}\"",
    ),
    (
        EMPLOYEE_EMAIL_SUBJECT,
        "Goods return {{COMPLAINT_NUMBER}} for agreement {{AGREEMENT_NUMBER}}",
    ),
    (EMPLOYEE_EMAIL_BODY, EMPLOYEE_EMAIL_BODY_TEMPLATE),
    (
        CLIENT_EMAIL_SUBJECT,
        "Your goods return {{COMPLAINT_NUMBER}} has been updated",
    ),
    (CLIENT_EMAIL_BODY, CLIENT_EMAIL_BODY_TEMPLATE),
];

const EMPLOYEE_EMAIL_BODY_TEMPLATE: &str = r#"Goods return complaint {{COMPLAINT_NUMBER}} (#{{COMPLAINT_ID}})

Date: {{DATE}}
Client: {{CLIENT_NAME}} (#{{CLIENT_ID}})
Consumption: {{CONSUMPTION_NUMBER}} (#{{CONSUMPTION_ID}})
Agreement: {{AGREEMENT_NUMBER}}
Created by: {{CREATOR_NAME}} (#{{CREATOR_ID}})
Expert: {{EXPERT_NAME}} (#{{EXPERT_ID}})
{{#if DIFFERENCES}}
{{DIFFERENCES}}
{{/if}}"#;

const CLIENT_EMAIL_BODY_TEMPLATE: &str = r#"Dear {{CLIENT_NAME}},

Your goods return {{COMPLAINT_NUMBER}} of {{DATE}} under agreement {{AGREEMENT_NUMBER}} has been updated.
{{#if DIFFERENCES}}
{{DIFFERENCES}}
{{/if}}
Your expert: {{EXPERT_NAME}}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_catalog_creation() {
        let catalog = TemplateCatalog::new();
        assert!(catalog.is_ok());
    }

    #[test]
    fn test_renders_status_change_with_params() {
        let catalog = TemplateCatalog::new().unwrap();
        let text = catalog.translate(
            POSITION_STATUS_CHANGED,
            &json!({ "FROM": "Accepted", "TO": "Rejected" }),
            1,
        );
        assert_eq!(text, "Position status has changed from \"Accepted\" to \"Rejected\"");
    }

    #[test]
    fn test_new_position_needs_no_params() {
        let catalog = TemplateCatalog::new().unwrap();
        assert_eq!(
            catalog.translate(NEW_POSITION_ADDED, &Value::Null, 1),
            "New position added"
        );
    }

    #[test]
    fn test_reseller_locale_with_default_fallback() {
        let mut catalog = TemplateCatalog::new().unwrap().with_reseller_locale(7, "ru");
        catalog
            .register("ru", NEW_POSITION_ADDED, "Добавлена новая позиция")
            .unwrap();

        assert_eq!(
            catalog.translate(NEW_POSITION_ADDED, &Value::Null, 7),
            "Добавлена новая позиция"
        );
        // Key missing in "ru" falls back to the default locale.
        assert_eq!(
            catalog.translate(POSITION_STATUS_CHANGED, &json!({ "FROM": "a", "TO": "b" }), 7),
            "Position status has changed from \"a\" to \"b\""
        );
        // Other resellers keep the default locale.
        assert_eq!(
            catalog.translate(NEW_POSITION_ADDED, &Value::Null, 8),
            "New position added"
        );
    }

    #[test]
    fn test_unknown_key_yields_key() {
        let catalog = TemplateCatalog::new().unwrap();
        assert_eq!(catalog.translate("noSuchKey", &Value::Null, 1), "noSuchKey");
    }

    #[test]
    fn test_values_are_not_html_escaped() {
        let catalog = TemplateCatalog::new().unwrap();
        let text = catalog.translate(
            CLIENT_EMAIL_SUBJECT,
            &json!({ "COMPLAINT_NUMBER": "R&amp;D-1" }),
            1,
        );
        assert_eq!(text, "Your goods return R&amp;D-1 has been updated");
    }

    #[test]
    fn test_register_json_overrides() {
        let mut catalog = TemplateCatalog::new().unwrap().with_default_locale("de");
        catalog
            .register_json(r#"{ "de": { "NewPositionAdded": "Neue Position hinzugefügt" } }"#)
            .unwrap();
        assert_eq!(
            catalog.translate(NEW_POSITION_ADDED, &Value::Null, 1),
            "Neue Position hinzugefügt"
        );
        assert!(catalog.register_json("[1, 2]").is_err());
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let mut catalog = TemplateCatalog::new().unwrap();
        let result = catalog.register("en", "broken", "{{#if}}");
        assert!(matches!(result, Err(NotificationError::Config(_))));
    }
}
