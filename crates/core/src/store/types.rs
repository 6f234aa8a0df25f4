//! Core ticket desk data types.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Status assigned to tickets created without one ("open").
pub const DEFAULT_STATUS: &str = "offen";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// A support/development work item.
///
/// Serialized in camelCase so persisted documents and API payloads use
/// `createdAt`/`updatedAt`. `updated_at` stays absent until the first mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Millisecond timestamp of creation, unique within a store.
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Author name. Not enforced against the author list.
    #[serde(default)]
    pub author: String,
    /// Group name. Not enforced against the group list.
    #[serde(default)]
    pub group: String,
    /// Free-form status, `"offen"` by default.
    #[serde(default = "default_status")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Build a fresh ticket from a create request.
    pub fn from_new(id: i64, new: NewTicket, created_at: DateTime<Utc>) -> Self {
        let status = new
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_status);

        Self {
            id,
            title: new.title,
            description: new.description,
            author: new.author,
            group: new.group,
            status,
            created_at,
            updated_at: None,
        }
    }

    /// Set the status and refresh `updated_at`, leaving all other fields alone.
    pub fn set_status(&mut self, status: String, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(at);
    }
}

/// Request to create a new ticket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTicket {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub group: String,
    /// Missing or empty means [`DEFAULT_STATUS`].
    #[serde(default)]
    pub status: Option<String>,
}

/// Field-wise replacement of a ticket. Absent fields keep their current value.
///
/// `id` and `createdAt` are not part of this type, so a body carrying them
/// cannot overwrite either.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TicketUpdate {
    /// Merge this update over `ticket` and refresh `updated_at`.
    pub fn apply(self, ticket: &mut Ticket, at: DateTime<Utc>) {
        if let Some(title) = self.title {
            ticket.title = title;
        }
        if let Some(description) = self.description {
            ticket.description = description;
        }
        if let Some(author) = self.author {
            ticket.author = author;
        }
        if let Some(group) = self.group {
            ticket.group = group;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
        ticket.updated_at = Some(at);
    }
}

/// The two name lists kept next to tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCollection {
    Groups,
    Authors,
}

impl NameCollection {
    /// Table / document key holding this collection.
    pub fn key(&self) -> &'static str {
        match self {
            NameCollection::Groups => "groups",
            NameCollection::Authors => "authors",
        }
    }
}

/// Full snapshot of a store, also the on-disk layout of the file backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub admin_password: String,
}

impl Dataset {
    /// A dataset containing only seed data.
    pub fn seeded(seed: &SeedData) -> Self {
        Self {
            tickets: Vec::new(),
            groups: seed.groups.clone(),
            authors: seed.authors.clone(),
            admin_password: seed.admin_password.clone(),
        }
    }

    pub fn names(&self, collection: NameCollection) -> &Vec<String> {
        match collection {
            NameCollection::Groups => &self.groups,
            NameCollection::Authors => &self.authors,
        }
    }

    pub fn names_mut(&mut self, collection: NameCollection) -> &mut Vec<String> {
        match collection {
            NameCollection::Groups => &mut self.groups,
            NameCollection::Authors => &mut self.authors,
        }
    }

    pub fn ticket_mut(&mut self, id: i64) -> Option<&mut Ticket> {
        self.tickets.iter_mut().find(|t| t.id == id)
    }

    pub fn highest_ticket_id(&self) -> Option<i64> {
        self.tickets.iter().map(|t| t.id).max()
    }
}

/// Default content written when a store is initialized for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub groups: Vec<String>,
    pub authors: Vec<String>,
    pub admin_password: String,
}

/// Current time at millisecond precision, matching what gets persisted.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Allocate a ticket id from the creation time.
///
/// Ids are the creation time in epoch milliseconds, bumped past `highest`
/// when two tickets are created within the same millisecond.
pub fn next_ticket_id(at: DateTime<Utc>, highest: Option<i64>) -> i64 {
    let millis = at.timestamp_millis();
    match highest {
        Some(highest) if highest >= millis => highest + 1,
        _ => millis,
    }
}

/// Order tickets newest first.
pub fn sort_newest_first(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
