//! SQLite-backed store implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::info;

use crate::auth::passwords_match;

use super::{
    next_ticket_id, now, Dataset, NameCollection, NewTicket, SeedData, Store, StoreError, Ticket,
    TicketUpdate,
};

const ADMIN_PASSWORD_KEY: &str = "admin_password";

const TICKET_COLUMNS: &str =
    r#"id, title, description, author, "group", status, created_at, updated_at"#;

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// SQLite-backed store with one table per collection.
///
/// The single connection is guarded by a mutex, so each operation, including
/// read-then-write sequences like a password change, runs without interleaving
/// within this process. Statements run on tokio's blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    seed: SeedData,
}

impl SqliteStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path, seed: SeedData) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            seed,
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory(seed: SeedData) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            seed,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                author TEXT NOT NULL DEFAULT '',
                "group" TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'offen',
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            CREATE TABLE IF NOT EXISTS "groups" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at DESC);
            "#,
        )
        .map_err(db_err)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))?;
            f(&*conn)
        })
        .await
        .map_err(|e| StoreError::Database(format!("database task failed: {}", e)))?
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let created_at_str: String = row.get(6)?;
        let updated_at_str: Option<String> = row.get(7)?;

        Ok(Ticket {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            author: row.get(3)?,
            group: row.get(4)?,
            status: row.get(5)?,
            created_at: parse_timestamp(6, &created_at_str)?,
            updated_at: updated_at_str
                .map(|s| parse_timestamp(7, &s))
                .transpose()?,
        })
    }

    fn fetch_ticket(conn: &Connection, id: i64) -> Result<Ticket, StoreError> {
        conn.query_row(
            &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
            params![id],
            Self::row_to_ticket,
        )
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| StoreError::ticket_not_found(id))
    }

    fn fetch_tickets(conn: &Connection) -> Result<Vec<Ticket>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tickets ORDER BY created_at DESC, id DESC",
                TICKET_COLUMNS
            ))
            .map_err(db_err)?;

        let rows = stmt.query_map([], Self::row_to_ticket).map_err(db_err)?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result.map_err(db_err)?);
        }
        Ok(tickets)
    }

    fn fetch_names(conn: &Connection, collection: NameCollection) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                r#"SELECT name FROM "{}" ORDER BY name ASC"#,
                collection.key()
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut names = Vec::new();
        for row_result in rows {
            names.push(row_result.map_err(db_err)?);
        }
        Ok(names)
    }

    fn fetch_admin_password(conn: &Connection) -> Result<String, StoreError> {
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![ADMIN_PASSWORD_KEY],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| StoreError::Database("admin password setting missing".to_string()))
    }

    fn write_ticket(conn: &Connection, ticket: &Ticket) -> Result<(), StoreError> {
        conn.execute(
            r#"UPDATE tickets SET title = ?, description = ?, author = ?, "group" = ?, status = ?, updated_at = ? WHERE id = ?"#,
            params![
                ticket.title,
                ticket.description,
                ticket.author,
                ticket.group,
                ticket.status,
                ticket.updated_at.map(format_timestamp),
                ticket.id,
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn seed_names(
        conn: &Connection,
        collection: NameCollection,
        names: &[String],
    ) -> Result<(), StoreError> {
        let count: i64 = conn
            .query_row(
                &format!(r#"SELECT COUNT(*) FROM "{}""#, collection.key()),
                [],
                |row| row.get(0),
            )
            .map_err(db_err)?;

        if count > 0 {
            return Ok(());
        }

        info!("Seeding {} {}", names.len(), collection.key());
        let sql = format!(
            r#"INSERT OR IGNORE INTO "{}" (name) VALUES (?)"#,
            collection.key()
        );
        for name in names {
            conn.execute(&sql, params![name]).map_err(db_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        let seed = self.seed.clone();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction().map_err(db_err)?;
            Self::seed_names(&tx, NameCollection::Groups, &seed.groups)?;
            Self::seed_names(&tx, NameCollection::Authors, &seed.authors)?;
            tx.execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)",
                params![ADMIN_PASSWORD_KEY, seed.admin_password],
            )
            .map_err(db_err)?;
            tx.commit().map_err(db_err)
        })
        .await
    }

    async fn load_all(&self) -> Result<Dataset, StoreError> {
        self.with_conn(move |conn| {
            Ok(Dataset {
                tickets: Self::fetch_tickets(conn)?,
                groups: Self::fetch_names(conn, NameCollection::Groups)?,
                authors: Self::fetch_names(conn, NameCollection::Authors)?,
                admin_password: Self::fetch_admin_password(conn)?,
            })
        })
        .await
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        self.with_conn(Self::fetch_tickets).await
    }

    async fn get_ticket(&self, id: i64) -> Result<Ticket, StoreError> {
        self.with_conn(move |conn| Self::fetch_ticket(conn, id)).await
    }

    async fn create_ticket(&self, request: NewTicket) -> Result<Ticket, StoreError> {
        self.with_conn(move |conn| {
            let highest: Option<i64> = conn
                .query_row("SELECT MAX(id) FROM tickets", [], |row| row.get(0))
                .map_err(db_err)?;

            let created_at = now();
            let ticket = Ticket::from_new(next_ticket_id(created_at, highest), request, created_at);

            conn.execute(
                r#"INSERT INTO tickets (id, title, description, author, "group", status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                params![
                    ticket.id,
                    ticket.title,
                    ticket.description,
                    ticket.author,
                    ticket.group,
                    ticket.status,
                    format_timestamp(ticket.created_at),
                ],
            )
            .map_err(db_err)?;

            Ok(ticket)
        })
        .await
    }

    async fn replace_ticket(&self, id: i64, update: TicketUpdate) -> Result<Ticket, StoreError> {
        self.with_conn(move |conn| {
            let mut ticket = Self::fetch_ticket(conn, id)?;
            update.apply(&mut ticket, now());
            Self::write_ticket(conn, &ticket)?;
            Ok(ticket)
        })
        .await
    }

    async fn set_ticket_status(&self, id: i64, status: String) -> Result<Ticket, StoreError> {
        self.with_conn(move |conn| {
            let mut ticket = Self::fetch_ticket(conn, id)?;
            ticket.set_status(status, now());

            conn.execute(
                "UPDATE tickets SET status = ?, updated_at = ? WHERE id = ?",
                params![ticket.status, ticket.updated_at.map(format_timestamp), id],
            )
            .map_err(db_err)?;

            Ok(ticket)
        })
        .await
    }

    async fn delete_ticket(&self, id: i64) -> Result<Ticket, StoreError> {
        self.with_conn(move |conn| {
            let ticket = Self::fetch_ticket(conn, id)?;
            conn.execute("DELETE FROM tickets WHERE id = ?", params![id])
                .map_err(db_err)?;
            Ok(ticket)
        })
        .await
    }

    async fn list_names(&self, collection: NameCollection) -> Result<Vec<String>, StoreError> {
        self.with_conn(move |conn| Self::fetch_names(conn, collection)).await
    }

    async fn add_name(&self, collection: NameCollection, name: String) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let result = conn.execute(
                &format!(r#"INSERT INTO "{}" (name) VALUES (?)"#, collection.key()),
                params![name],
            );

            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::Conflict(name))
                }
                Err(e) => Err(db_err(e)),
            }
        })
        .await
    }

    async fn remove_name(&self, collection: NameCollection, name: &str) -> Result<(), StoreError> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                &format!(r#"DELETE FROM "{}" WHERE name = ?"#, collection.key()),
                params![name],
            )
            .map_err(db_err)?;
            Ok(())
        })
        .await
    }

    async fn check_admin_password(&self, candidate: &str) -> Result<bool, StoreError> {
        let candidate = candidate.to_string();
        self.with_conn(move |conn| {
            let stored = Self::fetch_admin_password(conn)?;
            Ok(passwords_match(&candidate, &stored))
        })
        .await
    }

    async fn change_admin_password(&self, old: &str, new: String) -> Result<(), StoreError> {
        let old = old.to_string();
        self.with_conn(move |conn| {
            let stored = Self::fetch_admin_password(conn)?;
            if !passwords_match(&old, &stored) {
                return Err(StoreError::Unauthorized);
            }

            conn.execute(
                "UPDATE settings SET value = ? WHERE key = ?",
                params![new, ADMIN_PASSWORD_KEY],
            )
            .map_err(db_err)?;
            Ok(())
        })
        .await
    }
}
