//! Repository ports backed by `JsonCollection` files.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{
    EventEntity, MessageEntity, NoteEntity, PackageEntity, PlanEntity, SupplierEntity,
    ThreadEntity, UserEntity,
};
use super::json_store::JsonCollection;
use crate::contract::model::{
    Message, Note, Package, PlanEntry, Supplier, Thread, TrackedEvent, User,
};
use crate::domain::repo::{
    EventsRepository, MessagesRepository, NotesRepository, PackagesRepository, PlansRepository,
    SuppliersRepository, ThreadsRepository, UsersRepository,
};
use crate::domain::service::new_id;

fn into_models<E, M: From<E>>(rows: Vec<E>) -> Vec<M> {
    rows.into_iter().map(M::from).collect()
}

pub struct JsonUsersRepository {
    rows: JsonCollection<UserEntity>,
}

impl JsonUsersRepository {
    pub fn new(rows: JsonCollection<UserEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl UsersRepository for JsonUsersRepository {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let wanted = email.to_lowercase();
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .find(|u| u.email.to_lowercase() == wanted)
            .map(User::from))
    }

    async fn insert_if_email_free(&self, user: User) -> anyhow::Result<bool> {
        let wanted = user.email.to_lowercase();
        self.rows
            .modify(|rows| {
                if rows.iter().any(|u| u.email.to_lowercase() == wanted) {
                    return false;
                }
                rows.push(user.into());
                true
            })
            .await
    }

    async fn set_notify(&self, id: &str, notify: bool) -> anyhow::Result<Option<User>> {
        self.rows
            .modify(|rows| {
                rows.iter_mut().find(|u| u.id == id).map(|u| {
                    u.notify = notify;
                    User::from(u.clone())
                })
            })
            .await
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(into_models(self.rows.load().await?))
    }
}

pub struct JsonSuppliersRepository {
    rows: JsonCollection<SupplierEntity>,
}

impl JsonSuppliersRepository {
    pub fn new(rows: JsonCollection<SupplierEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl SuppliersRepository for JsonSuppliersRepository {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Supplier>> {
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .map(Supplier::from))
    }

    async fn list(&self) -> anyhow::Result<Vec<Supplier>> {
        Ok(into_models(self.rows.load().await?))
    }

    async fn insert(&self, supplier: Supplier) -> anyhow::Result<()> {
        self.rows.modify(|rows| rows.push(supplier.into())).await
    }

    async fn update(&self, supplier: Supplier) -> anyhow::Result<bool> {
        self.rows
            .modify(|rows| match rows.iter_mut().find(|s| s.id == supplier.id) {
                Some(slot) => {
                    *slot = supplier.into();
                    true
                }
                None => false,
            })
            .await
    }
}

pub struct JsonPackagesRepository {
    rows: JsonCollection<PackageEntity>,
}

impl JsonPackagesRepository {
    pub fn new(rows: JsonCollection<PackageEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl PackagesRepository for JsonPackagesRepository {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Package>> {
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .map(Package::from))
    }

    async fn list(&self) -> anyhow::Result<Vec<Package>> {
        Ok(into_models(self.rows.load().await?))
    }

    async fn insert(&self, package: Package) -> anyhow::Result<()> {
        self.rows.modify(|rows| rows.push(package.into())).await
    }

    async fn update(&self, package: Package) -> anyhow::Result<bool> {
        self.rows
            .modify(|rows| match rows.iter_mut().find(|p| p.id == package.id) {
                Some(slot) => {
                    *slot = package.into();
                    true
                }
                None => false,
            })
            .await
    }
}

pub struct JsonPlansRepository {
    rows: JsonCollection<PlanEntity>,
}

impl JsonPlansRepository {
    pub fn new(rows: JsonCollection<PlanEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl PlansRepository for JsonPlansRepository {
    async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<PlanEntry>> {
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .map(PlanEntry::from)
            .collect())
    }

    async fn insert_if_absent(&self, entry: PlanEntry) -> anyhow::Result<bool> {
        self.rows
            .modify(|rows| {
                let exists = rows
                    .iter()
                    .any(|p| p.user_id == entry.user_id && p.supplier_id == entry.supplier_id);
                if !exists {
                    rows.push(entry.into());
                }
                !exists
            })
            .await
    }

    async fn remove(&self, user_id: &str, supplier_id: &str) -> anyhow::Result<bool> {
        self.rows
            .modify(|rows| {
                let before = rows.len();
                rows.retain(|p| !(p.user_id == user_id && p.supplier_id == supplier_id));
                rows.len() != before
            })
            .await
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.rows.load().await?.len())
    }
}

pub struct JsonNotesRepository {
    rows: JsonCollection<NoteEntity>,
}

impl JsonNotesRepository {
    pub fn new(rows: JsonCollection<NoteEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl NotesRepository for JsonNotesRepository {
    async fn find_for_user(&self, user_id: &str) -> anyhow::Result<Option<Note>> {
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .find(|n| n.user_id == user_id)
            .map(Note::from))
    }

    async fn upsert(&self, user_id: &str, text: String, at: DateTime<Utc>) -> anyhow::Result<Note> {
        self.rows
            .modify(|rows| {
                if let Some(note) = rows.iter_mut().find(|n| n.user_id == user_id) {
                    note.text = text;
                    note.updated_at = Some(at);
                    return Note::from(note.clone());
                }
                let note = NoteEntity {
                    id: new_id("nte"),
                    user_id: user_id.to_string(),
                    text,
                    created_at: at,
                    updated_at: None,
                };
                rows.push(note.clone());
                Note::from(note)
            })
            .await
    }
}

pub struct JsonThreadsRepository {
    rows: JsonCollection<ThreadEntity>,
}

impl JsonThreadsRepository {
    pub fn new(rows: JsonCollection<ThreadEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl ThreadsRepository for JsonThreadsRepository {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Thread>> {
        Ok(self
            .rows
            .load()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .map(Thread::from))
    }

    async fn find_or_insert(&self, candidate: Thread) -> anyhow::Result<Thread> {
        self.rows
            .modify(|rows| {
                if let Some(existing) = rows.iter().find(|t| {
                    t.supplier_id == candidate.supplier_id && t.customer_id == candidate.customer_id
                }) {
                    return Thread::from(existing.clone());
                }
                rows.push(candidate.clone().into());
                candidate
            })
            .await
    }

    async fn list(&self) -> anyhow::Result<Vec<Thread>> {
        Ok(into_models(self.rows.load().await?))
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> anyhow::Result<bool> {
        self.rows
            .modify(|rows| match rows.iter_mut().find(|t| t.id == id) {
                Some(thread) => {
                    thread.updated_at = at;
                    true
                }
                None => false,
            })
            .await
    }
}

pub struct JsonMessagesRepository {
    rows: JsonCollection<MessageEntity>,
}

impl JsonMessagesRepository {
    pub fn new(rows: JsonCollection<MessageEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl MessagesRepository for JsonMessagesRepository {
    async fn insert(&self, message: Message) -> anyhow::Result<()> {
        self.rows.modify(|rows| rows.push(message.into())).await
    }

    async fn list(&self) -> anyhow::Result<Vec<Message>> {
        Ok(into_models(self.rows.load().await?))
    }
}

pub struct JsonEventsRepository {
    rows: JsonCollection<EventEntity>,
}

impl JsonEventsRepository {
    pub fn new(rows: JsonCollection<EventEntity>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl EventsRepository for JsonEventsRepository {
    async fn insert(&self, event: TrackedEvent) -> anyhow::Result<()> {
        self.rows.modify(|rows| rows.push(event.into())).await
    }

    async fn list(&self) -> anyhow::Result<Vec<TrackedEvent>> {
        Ok(into_models(self.rows.load().await?))
    }
}
