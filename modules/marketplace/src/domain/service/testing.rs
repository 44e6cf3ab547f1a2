//! Test support: a service over tempdir collections and scripted notifiers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use tokio::sync::Mutex;

use super::{new_id, Service, ServiceConfig};
use crate::contract::model::{Caller, Role, Supplier, User};
use crate::domain::ports::{Notifier, OutgoingMail};
use crate::infra::storage::open_repositories;

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        self.sent.lock().await.push(mail);
        Ok(())
    }
}

pub(crate) struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _mail: OutgoingMail) -> anyhow::Result<()> {
        anyhow::bail!("smtp relay unreachable")
    }
}

pub(crate) struct Fixture {
    pub service: Service,
    pub _dir: TempDir,
}

pub(crate) async fn fixture(notifier: Arc<dyn Notifier>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let repos = open_repositories(dir.path()).await.unwrap();
    Fixture {
        service: Service::new(repos, notifier, ServiceConfig::default()),
        _dir: dir,
    }
}

impl Fixture {
    /// Store a user directly, skipping password hashing.
    pub async fn user(&self, role: Role, email: &str, notify: bool) -> Caller {
        let user = User {
            id: new_id("usr"),
            name: email.to_string(),
            email: email.to_string(),
            role,
            password_hash: String::new(),
            notify,
            created_at: Utc::now(),
        };
        let caller = user.as_caller();
        assert!(self.service.repos.users.insert_if_email_free(user).await.unwrap());
        caller
    }

    pub async fn supplier(&self, owner: Option<&Caller>, category: &str, approved: bool) -> Supplier {
        let supplier = Supplier {
            id: new_id("sup"),
            owner_user_id: owner.map(|o| o.user_id.clone()),
            name: format!("{category} Co"),
            category: category.to_string(),
            location: "Cardiff".to_string(),
            price_display: "££".to_string(),
            website: String::new(),
            license: String::new(),
            amenities: vec![],
            max_guests: 0,
            photos: vec![],
            description_short: String::new(),
            description_long: String::new(),
            email: format!("{}@suppliers.test", category.to_lowercase()),
            approved,
        };
        self.service.repos.suppliers.insert(supplier.clone()).await.unwrap();
        supplier
    }
}
