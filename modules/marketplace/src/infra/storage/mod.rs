//! Flat-file datastore: one pretty-printed JSON array per collection under
//! the data directory.

pub mod entity;
pub mod json_store;
mod mapper;
pub mod repos;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::service::Repositories;
use json_store::JsonCollection;
use repos::{
    JsonEventsRepository, JsonMessagesRepository, JsonNotesRepository, JsonPackagesRepository,
    JsonPlansRepository, JsonSuppliersRepository, JsonThreadsRepository, JsonUsersRepository,
};

/// Open (and create if missing) every collection file under `data_dir`.
pub async fn open_repositories(data_dir: &Path) -> Result<Repositories> {
    let repos = Repositories {
        users: Arc::new(JsonUsersRepository::new(
            JsonCollection::open(data_dir, "users").await?,
        )),
        suppliers: Arc::new(JsonSuppliersRepository::new(
            JsonCollection::open(data_dir, "suppliers").await?,
        )),
        packages: Arc::new(JsonPackagesRepository::new(
            JsonCollection::open(data_dir, "packages").await?,
        )),
        plans: Arc::new(JsonPlansRepository::new(
            JsonCollection::open(data_dir, "plans").await?,
        )),
        notes: Arc::new(JsonNotesRepository::new(
            JsonCollection::open(data_dir, "notes").await?,
        )),
        threads: Arc::new(JsonThreadsRepository::new(
            JsonCollection::open(data_dir, "threads").await?,
        )),
        messages: Arc::new(JsonMessagesRepository::new(
            JsonCollection::open(data_dir, "messages").await?,
        )),
        events: Arc::new(JsonEventsRepository::new(
            JsonCollection::open(data_dir, "events").await?,
        )),
    };
    tracing::debug!(data_dir = %data_dir.display(), "opened collections");
    Ok(repos)
}
