//! Marketplace business rules. Handlers call into `Service`; the service
//! depends only on the repository and notifier ports.

use std::sync::Arc;

use crate::contract::model::{Caller, Role};
use crate::domain::error::DomainError;
use crate::domain::ports::{Notifier, OutgoingMail};
use crate::domain::repo::{
    EventsRepository, MessagesRepository, NotesRepository, PackagesRepository, PlansRepository,
    SuppliersRepository, ThreadsRepository, UsersRepository,
};

pub(crate) mod accounts;
mod catalog;
mod inbox;
mod insights;
mod planner;

#[cfg(test)]
pub(crate) mod testing;

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Repository ports the service works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub suppliers: Arc<dyn SuppliersRepository>,
    pub packages: Arc<dyn PackagesRepository>,
    pub plans: Arc<dyn PlansRepository>,
    pub notes: Arc<dyn NotesRepository>,
    pub threads: Arc<dyn ThreadsRepository>,
    pub messages: Arc<dyn MessagesRepository>,
    pub events: Arc<dyn EventsRepository>,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum number of packages on the featured shelf.
    pub featured_limit: usize,
    pub message_max_chars: usize,
    /// Absolute base for sitemap links, without trailing slash.
    pub public_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            featured_limit: 6,
            message_max_chars: 4000,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Service {
    repos: Repositories,
    notifier: Arc<dyn Notifier>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repos: Repositories, notifier: Arc<dyn Notifier>, config: ServiceConfig) -> Self {
        Self {
            repos,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn require_role(caller: &Caller, role: Role) -> Result<(), DomainError> {
        if caller.role == role {
            Ok(())
        } else {
            Err(DomainError::forbidden())
        }
    }

    fn require_customer(caller: &Caller) -> Result<(), DomainError> {
        if caller.role == Role::Customer {
            Ok(())
        } else {
            Err(DomainError::customers_only())
        }
    }

    /// Deliver a notification; failures are logged and dropped.
    async fn notify_best_effort(&self, mail: OutgoingMail) {
        let to = mail.to.clone();
        if let Err(e) = self.notifier.send(mail).await {
            tracing::warn!(to = %to, error = %format!("{e:#}"), "notification dispatch failed");
        }
    }
}

/// `<prefix>_<12 random chars>`.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", nanoid::nanoid!(12, &ID_ALPHABET))
}

/// Keep at most `max` characters.
pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Trimmed non-empty value, or `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix() {
        let id = new_id("sup");
        assert!(id.starts_with("sup_"));
        assert_eq!(id.len(), 16);
        assert!(id[4..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(new_id("sup"), id);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("££££", 2), "££");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn blank_values_are_none() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" x ")), Some("x"));
    }
}
