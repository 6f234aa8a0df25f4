//! Ticket API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketdesk_core::{NewTicket, StoreError, Ticket, TicketUpdate};
use tracing::info;

use super::error::ApiError;
use super::extract::JsonBody;
use crate::metrics::{TICKETS_CREATED_TOTAL, TICKETS_DELETED_TOTAL};
use crate::state::AppState;

const TICKET_NOT_FOUND: &str = "Ticket nicht gefunden";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for changing a ticket's status
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: Option<String>,
}

/// Response for a deleted ticket
#[derive(Debug, Serialize)]
pub struct DeleteTicketResponse {
    pub message: String,
    pub ticket: Ticket,
}

// ============================================================================
// Handlers
// ============================================================================

/// Non-numeric ids can never match a ticket.
fn parse_ticket_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(TICKET_NOT_FOUND))
}

fn ticket_error(err: StoreError, context: &str) -> ApiError {
    match err {
        StoreError::NotFound(_) => ApiError::not_found(TICKET_NOT_FOUND),
        other => ApiError::from_store(context, other),
    }
}

/// List all tickets, newest first
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    state
        .store()
        .list_tickets()
        .await
        .map(Json)
        .map_err(|e| ticket_error(e, "Fehler beim Laden der Tickets"))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let id = parse_ticket_id(&id)?;
    state
        .store()
        .get_ticket(id)
        .await
        .map(Json)
        .map_err(|e| ticket_error(e, "Fehler beim Laden des Tickets"))
}

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewTicket>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let ticket = state
        .store()
        .create_ticket(body)
        .await
        .map_err(|e| ticket_error(e, "Fehler beim Erstellen des Tickets"))?;

    TICKETS_CREATED_TOTAL.inc();
    info!(ticket_id = ticket.id, group = %ticket.group, "Ticket created");

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Replace the given fields of a ticket
pub async fn replace_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<TicketUpdate>,
) -> Result<Json<Ticket>, ApiError> {
    let id = parse_ticket_id(&id)?;
    state
        .store()
        .replace_ticket(id, body)
        .await
        .map(Json)
        .map_err(|e| ticket_error(e, "Fehler beim Aktualisieren des Tickets"))
}

/// Change only the status of a ticket
///
/// Without a status only `updatedAt` moves.
pub async fn set_ticket_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Ticket>, ApiError> {
    let id = parse_ticket_id(&id)?;
    let store = state.store();
    let result = match body.status {
        Some(status) => store.set_ticket_status(id, status).await,
        None => store.replace_ticket(id, TicketUpdate::default()).await,
    };
    result
        .map(Json)
        .map_err(|e| ticket_error(e, "Fehler beim Ändern des Status"))
}

/// Delete a ticket, returning the removed record
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTicketResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    let ticket = state
        .store()
        .delete_ticket(id)
        .await
        .map_err(|e| ticket_error(e, "Fehler beim Löschen des Tickets"))?;

    TICKETS_DELETED_TOTAL.inc();
    info!(ticket_id = ticket.id, "Ticket deleted");

    Ok(Json(DeleteTicketResponse {
        message: "Ticket gelöscht".to_string(),
        ticket,
    }))
}
