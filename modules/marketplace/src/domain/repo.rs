//! Persistence ports. Every call is atomic with respect to its own
//! collection; flows spanning several calls are not transactional.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{
    Message, Note, Package, PlanEntry, Supplier, Thread, TrackedEvent, User,
};

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Insert unless the email (case-insensitive) is taken. Returns `false` on conflict.
    async fn insert_if_email_free(&self, user: User) -> anyhow::Result<bool>;
    /// Returns the updated user, `None` if the id is unknown.
    async fn set_notify(&self, id: &str, notify: bool) -> anyhow::Result<Option<User>>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
pub trait SuppliersRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Supplier>>;
    async fn list(&self) -> anyhow::Result<Vec<Supplier>>;
    async fn insert(&self, supplier: Supplier) -> anyhow::Result<()>;
    /// Replace by id. Returns `false` if the id is unknown.
    async fn update(&self, supplier: Supplier) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait PackagesRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Package>>;
    async fn list(&self) -> anyhow::Result<Vec<Package>>;
    async fn insert(&self, package: Package) -> anyhow::Result<()>;
    async fn update(&self, package: Package) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait PlansRepository: Send + Sync {
    async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<PlanEntry>>;
    /// Insert unless `(user_id, supplier_id)` already exists. Returns `true` if inserted.
    async fn insert_if_absent(&self, entry: PlanEntry) -> anyhow::Result<bool>;
    async fn remove(&self, user_id: &str, supplier_id: &str) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<usize>;
}

#[async_trait]
pub trait NotesRepository: Send + Sync {
    async fn find_for_user(&self, user_id: &str) -> anyhow::Result<Option<Note>>;
    /// Replace the user's note text, creating it if needed.
    async fn upsert(&self, user_id: &str, text: String, at: DateTime<Utc>) -> anyhow::Result<Note>;
}

#[async_trait]
pub trait ThreadsRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Thread>>;
    /// Return the thread for `(supplier_id, customer_id)`, inserting `candidate`
    /// when there is none yet.
    async fn find_or_insert(&self, candidate: Thread) -> anyhow::Result<Thread>;
    async fn list(&self) -> anyhow::Result<Vec<Thread>>;
    async fn touch(&self, id: &str, at: DateTime<Utc>) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait MessagesRepository: Send + Sync {
    async fn insert(&self, message: Message) -> anyhow::Result<()>;
    async fn list(&self) -> anyhow::Result<Vec<Message>>;
}

#[async_trait]
pub trait EventsRepository: Send + Sync {
    async fn insert(&self, event: TrackedEvent) -> anyhow::Result<()>;
    async fn list(&self) -> anyhow::Result<Vec<TrackedEvent>>;
}
