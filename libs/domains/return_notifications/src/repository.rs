use async_trait::async_trait;

use crate::models::{Client, Employee, Reseller};

/// Lookup of the reference records a return complaint points at.
///
/// Implementations can be backed by any store (the CLI uses
/// [`InMemoryDirectory`](crate::directory::InMemoryDirectory)).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Get a reseller by ID
    async fn find_reseller(&self, id: i64) -> Option<Reseller>;

    /// Get an employee by ID
    async fn find_employee(&self, id: i64) -> Option<Employee>;

    /// Get a client (contractor) by ID
    async fn find_client(&self, id: i64) -> Option<Client>;
}

/// Addressing data for outgoing emails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// Address the reseller sends emails from, if configured
    async fn sender_email(&self, reseller_id: i64) -> Option<String>;

    /// Employee addresses holding the given permit for the reseller
    async fn emails_by_permit(&self, reseller_id: i64, permit: &str) -> Vec<String>;
}

/// Human-readable names of complaint status codes.
#[cfg_attr(test, mockall::automock)]
pub trait StatusNames: Send + Sync {
    fn status_name(&self, code: i64) -> String;
}
