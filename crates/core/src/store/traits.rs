use async_trait::async_trait;

use super::{Dataset, NameCollection, NewTicket, StoreError, Ticket, TicketUpdate};

/// Persistence for tickets, groups, authors and the admin password.
///
/// Every backend exposes the same semantics; the HTTP layer only ever talks
/// to an `Arc<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend identifier used in logs and the health response.
    fn backend_name(&self) -> &'static str;

    /// Create the backing storage if needed and write seed data into empty
    /// collections. Safe to call more than once.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Full snapshot of all collections.
    async fn load_all(&self) -> Result<Dataset, StoreError>;

    /// All tickets, newest first.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError>;

    async fn get_ticket(&self, id: i64) -> Result<Ticket, StoreError>;

    /// Assign an id and creation time and persist the ticket.
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    /// Merge `update` over the stored ticket.
    async fn replace_ticket(&self, id: i64, update: TicketUpdate) -> Result<Ticket, StoreError>;

    /// Change only the status (and `updated_at`).
    async fn set_ticket_status(&self, id: i64, status: String) -> Result<Ticket, StoreError>;

    /// Remove a ticket, returning the removed record.
    async fn delete_ticket(&self, id: i64) -> Result<Ticket, StoreError>;

    async fn list_names(&self, collection: NameCollection) -> Result<Vec<String>, StoreError>;

    /// Insert a name. Fails with [`StoreError::Conflict`] if it is already present.
    async fn add_name(&self, collection: NameCollection, name: String) -> Result<(), StoreError>;

    /// Remove a name. Absent names are not an error.
    async fn remove_name(&self, collection: NameCollection, name: &str) -> Result<(), StoreError>;

    async fn check_admin_password(&self, candidate: &str) -> Result<bool, StoreError>;

    /// Replace the admin password. Fails with [`StoreError::Unauthorized`] and
    /// leaves the password untouched when `old` does not match.
    async fn change_admin_password(&self, old: &str, new: String) -> Result<(), StoreError>;

    async fn list_groups(&self) -> Result<Vec<String>, StoreError> {
        self.list_names(NameCollection::Groups).await
    }

    async fn add_group(&self, name: String) -> Result<(), StoreError> {
        self.add_name(NameCollection::Groups, name).await
    }

    async fn remove_group(&self, name: &str) -> Result<(), StoreError> {
        self.remove_name(NameCollection::Groups, name).await
    }

    async fn list_authors(&self) -> Result<Vec<String>, StoreError> {
        self.list_names(NameCollection::Authors).await
    }

    async fn add_author(&self, name: String) -> Result<(), StoreError> {
        self.add_name(NameCollection::Authors, name).await
    }

    async fn remove_author(&self, name: &str) -> Result<(), StoreError> {
        self.remove_name(NameCollection::Authors, name).await
    }
}
