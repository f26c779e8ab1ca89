//! In-memory reference directory.
//!
//! Backs [`ReferenceRepository`], [`RecipientRepository`] and
//! [`StatusNames`] with data loaded from a JSON document:
//!
//! ```json
//! {
//!   "resellers": [{ "id": 1, "name": "North", "sender_email": "returns@north.test", "locale": "en" }],
//!   "employees": [{ "id": 3, "full_name": "Olga Petrova" }],
//!   "clients":   [{ "id": 7, "name": "ivanov", "email": "ivanov@mail.test", "mobile": "+70000000000" }],
//!   "permits":   [{ "reseller_id": 1, "permit": "tsGoodsReturn", "emails": ["desk@north.test"] }],
//!   "statuses":  { "1": "Accepted", "2": "Rejected" }
//! }
//! ```

use crate::error::NotificationResult;
use crate::models::{Client, Employee, Reseller};
use crate::repository::{RecipientRepository, ReferenceRepository, StatusNames};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Permit grant: employee addresses allowed to receive a kind of notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitGrant {
    pub reseller_id: i64,
    pub permit: String,
    pub emails: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryDocument {
    #[serde(default)]
    resellers: Vec<Reseller>,
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    permits: Vec<PermitGrant>,
    #[serde(default)]
    statuses: HashMap<i64, String>,
}

/// Reference data held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    resellers: HashMap<i64, Reseller>,
    employees: HashMap<i64, Employee>,
    clients: HashMap<i64, Client>,
    permits: HashMap<(i64, String), Vec<String>>,
    statuses: HashMap<i64, String>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a directory document.
    pub fn from_json_str(json: &str) -> NotificationResult<Self> {
        let document: DirectoryDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Load a directory document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> NotificationResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let directory = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            resellers = directory.resellers.len(),
            employees = directory.employees.len(),
            clients = directory.clients.len(),
            "Loaded reference directory"
        );
        Ok(directory)
    }

    pub fn with_reseller(mut self, reseller: Reseller) -> Self {
        self.resellers.insert(reseller.id, reseller);
        self
    }

    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.insert(employee.id, employee);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.clients.insert(client.id, client);
        self
    }

    /// Grant `permit` to additional addresses of a reseller.
    pub fn with_permit<I, S>(mut self, reseller_id: i64, permit: &str, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permits
            .entry((reseller_id, permit.to_string()))
            .or_default()
            .extend(emails.into_iter().map(Into::into));
        self
    }

    pub fn with_status(mut self, code: i64, name: impl Into<String>) -> Self {
        self.statuses.insert(code, name.into());
        self
    }

    /// Locale configured for a reseller, if any.
    pub fn reseller_locales(&self) -> impl Iterator<Item = (i64, &str)> {
        self.resellers
            .values()
            .filter_map(|r| r.locale.as_deref().map(|locale| (r.id, locale)))
    }

    fn from_document(document: DirectoryDocument) -> Self {
        let mut directory = Self {
            statuses: document.statuses,
            ..Self::default()
        };
        for reseller in document.resellers {
            directory = directory.with_reseller(reseller);
        }
        for employee in document.employees {
            directory = directory.with_employee(employee);
        }
        for client in document.clients {
            directory = directory.with_client(client);
        }
        for grant in document.permits {
            directory = directory.with_permit(grant.reseller_id, &grant.permit, grant.emails);
        }
        directory
    }
}

#[async_trait]
impl ReferenceRepository for InMemoryDirectory {
    async fn find_reseller(&self, id: i64) -> Option<Reseller> {
        self.resellers.get(&id).cloned()
    }

    async fn find_employee(&self, id: i64) -> Option<Employee> {
        self.employees.get(&id).cloned()
    }

    async fn find_client(&self, id: i64) -> Option<Client> {
        self.clients.get(&id).cloned()
    }
}

#[async_trait]
impl RecipientRepository for InMemoryDirectory {
    async fn sender_email(&self, reseller_id: i64) -> Option<String> {
        self.resellers
            .get(&reseller_id)
            .and_then(|r| r.sender_email.clone())
            .filter(|email| !email.is_empty())
    }

    async fn emails_by_permit(&self, reseller_id: i64, permit: &str) -> Vec<String> {
        self.permits
            .get(&(reseller_id, permit.to_string()))
            .map(|emails| emails.iter().filter(|e| !e.is_empty()).cloned().collect())
            .unwrap_or_default()
    }
}

impl StatusNames for InMemoryDirectory {
    /// Unknown codes render as `#<code>`.
    fn status_name(&self, code: i64) -> String {
        self.statuses
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("#{}", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "resellers": [
            { "id": 1, "name": "North", "sender_email": "returns@north.test", "locale": "ru" },
            { "id": 2, "name": "South" }
        ],
        "employees": [{ "id": 3, "full_name": "Olga Petrova" }],
        "clients": [{ "id": 7, "name": "ivanov", "email": "ivanov@mail.test" }],
        "permits": [
            { "reseller_id": 1, "permit": "tsGoodsReturn", "emails": ["desk@north.test", ""] }
        ],
        "statuses": { "1": "Accepted", "2": "Rejected" }
    }"#;

    #[tokio::test]
    async fn test_lookups_from_document() {
        let directory = InMemoryDirectory::from_json_str(DOCUMENT).unwrap();

        assert_eq!(directory.find_reseller(1).await.unwrap().name, "North");
        assert!(directory.find_reseller(9).await.is_none());
        assert_eq!(directory.find_employee(3).await.unwrap().full_name, "Olga Petrova");
        let client = directory.find_client(7).await.unwrap();
        assert_eq!(client.mobile, "");
        assert_eq!(client.display_name(), "ivanov");
    }

    #[tokio::test]
    async fn test_sender_and_permits() {
        let directory = InMemoryDirectory::from_json_str(DOCUMENT).unwrap();

        assert_eq!(
            directory.sender_email(1).await.as_deref(),
            Some("returns@north.test")
        );
        assert_eq!(directory.sender_email(2).await, None);
        assert_eq!(
            directory.emails_by_permit(1, "tsGoodsReturn").await,
            vec!["desk@north.test".to_string()]
        );
        assert!(directory.emails_by_permit(1, "other").await.is_empty());
        assert!(directory.emails_by_permit(2, "tsGoodsReturn").await.is_empty());
    }

    #[test]
    fn test_status_names() {
        let directory = InMemoryDirectory::from_json_str(DOCUMENT).unwrap();
        assert_eq!(directory.status_name(2), "Rejected");
        assert_eq!(directory.status_name(42), "#42");
    }

    #[test]
    fn test_reseller_locales() {
        let directory = InMemoryDirectory::from_json_str(DOCUMENT).unwrap();
        let locales: Vec<_> = directory.reseller_locales().collect();
        assert_eq!(locales, vec![(1, "ru")]);
    }

    #[test]
    fn test_invalid_document_is_rejected() {
        assert!(InMemoryDirectory::from_json_str("{ not json").is_err());
    }
}
