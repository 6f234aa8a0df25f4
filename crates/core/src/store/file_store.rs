//! Whole-document JSON file store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::auth::passwords_match;

use super::{
    next_ticket_id, now, sort_newest_first, Dataset, NameCollection, NewTicket, SeedData, Store,
    StoreError, Ticket, TicketUpdate,
};

/// Store that keeps every collection in one JSON document.
///
/// Reads re-parse the whole file. Mutations load, modify and rewrite the whole
/// document while holding `write_lock`, so concurrent requests in this process
/// cannot drop each other's changes. The rewrite goes to a temp file that is
/// then renamed over the original.
pub struct JsonFileStore {
    path: PathBuf,
    seed: SeedData,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, seed: SeedData) -> Self {
        Self {
            path: path.into(),
            seed,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    async fn read(&self) -> Result<Option<Dataset>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map(Some).map_err(|e| {
                StoreError::Serialization(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, data: &Dataset) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.temp_path();
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Load the document, writing seed data first if the file is missing.
    /// Caller must hold `write_lock`.
    async fn load_or_seed_locked(&self) -> Result<Dataset, StoreError> {
        if let Some(data) = self.read().await? {
            return Ok(data);
        }

        info!("Data file {:?} missing, writing seed data", self.path);
        let data = Dataset::seeded(&self.seed);
        self.write(&data).await?;
        Ok(data)
    }

    async fn snapshot(&self) -> Result<Dataset, StoreError> {
        if let Some(data) = self.read().await? {
            return Ok(data);
        }
        let _guard = self.write_lock.lock().await;
        self.load_or_seed_locked().await
    }

    /// Run `f` against the current document and persist the result.
    ///
    /// Nothing is written when `f` fails or reports no change.
    async fn mutate<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Dataset) -> Result<(T, bool), StoreError> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load_or_seed_locked().await?;
        let (result, changed) = f(&mut data)?;
        if changed {
            self.write(&data).await?;
        }
        Ok(result)
    }
}

#[async_trait]
impl Store for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let _guard = self.write_lock.lock().await;
        let data = self.load_or_seed_locked().await?;
        debug!(
            "Data file {:?} holds {} tickets, {} groups, {} authors",
            self.path,
            data.tickets.len(),
            data.groups.len(),
            data.authors.len()
        );
        Ok(())
    }

    async fn load_all(&self) -> Result<Dataset, StoreError> {
        let mut data = self.snapshot().await?;
        sort_newest_first(&mut data.tickets);
        Ok(data)
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets = self.snapshot().await?.tickets;
        sort_newest_first(&mut tickets);
        Ok(tickets)
    }

    async fn get_ticket(&self, id: i64) -> Result<Ticket, StoreError> {
        self.snapshot()
            .await?
            .tickets
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::ticket_not_found(id))
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        self.mutate(|data| {
            let created_at = now();
            let id = next_ticket_id(created_at, data.highest_ticket_id());
            let ticket = Ticket::from_new(id, ticket, created_at);
            data.tickets.push(ticket.clone());
            Ok((ticket, true))
        })
        .await
    }

    async fn replace_ticket(&self, id: i64, update: TicketUpdate) -> Result<Ticket, StoreError> {
        self.mutate(|data| {
            let ticket = data
                .ticket_mut(id)
                .ok_or_else(|| StoreError::ticket_not_found(id))?;
            update.apply(ticket, now());
            Ok((ticket.clone(), true))
        })
        .await
    }

    async fn set_ticket_status(&self, id: i64, status: String) -> Result<Ticket, StoreError> {
        self.mutate(|data| {
            let ticket = data
                .ticket_mut(id)
                .ok_or_else(|| StoreError::ticket_not_found(id))?;
            ticket.set_status(status, now());
            Ok((ticket.clone(), true))
        })
        .await
    }

    async fn delete_ticket(&self, id: i64) -> Result<Ticket, StoreError> {
        self.mutate(|data| {
            let index = data
                .tickets
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::ticket_not_found(id))?;
            Ok((data.tickets.remove(index), true))
        })
        .await
    }

    async fn list_names(&self, collection: NameCollection) -> Result<Vec<String>, StoreError> {
        let data = self.snapshot().await?;
        Ok(data.names(collection).clone())
    }

    async fn add_name(&self, collection: NameCollection, name: String) -> Result<(), StoreError> {
        self.mutate(|data| {
            let names = data.names_mut(collection);
            if names.contains(&name) {
                return Err(StoreError::Conflict(name));
            }
            names.push(name);
            Ok(((), true))
        })
        .await
    }

    async fn remove_name(&self, collection: NameCollection, name: &str) -> Result<(), StoreError> {
        self.mutate(|data| {
            let names = data.names_mut(collection);
            let before = names.len();
            names.retain(|n| n != name);
            Ok(((), names.len() != before))
        })
        .await
    }

    async fn check_admin_password(&self, candidate: &str) -> Result<bool, StoreError> {
        let data = self.snapshot().await?;
        Ok(passwords_match(candidate, &data.admin_password))
    }

    async fn change_admin_password(&self, old: &str, new: String) -> Result<(), StoreError> {
        self.mutate(|data| {
            if !passwords_match(old, &data.admin_password) {
                return Err(StoreError::Unauthorized);
            }
            data.admin_password = new;
            Ok(((), true))
        })
        .await
    }
}
