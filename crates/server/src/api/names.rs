//! Group and author list handlers.
//!
//! Both collections share one contract, so each route is a thin wrapper over
//! a handler parameterized by [`NameCollection`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketdesk_core::{NameCollection, StoreError};
use tracing::info;

use super::error::ApiError;
use super::extract::JsonBody;
use crate::state::AppState;

/// Request body for adding a name
#[derive(Debug, Deserialize)]
pub struct NameBody {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NameResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

struct Messages {
    list_failed: &'static str,
    add_failed: &'static str,
    exists: &'static str,
    remove_failed: &'static str,
    removed: &'static str,
}

const GROUP_MESSAGES: Messages = Messages {
    list_failed: "Fehler beim Laden der Gruppen",
    add_failed: "Fehler beim Hinzufügen der Gruppe",
    exists: "Gruppe existiert bereits",
    remove_failed: "Fehler beim Löschen der Gruppe",
    removed: "Gruppe gelöscht",
};

const AUTHOR_MESSAGES: Messages = Messages {
    list_failed: "Fehler beim Laden der Autoren",
    add_failed: "Fehler beim Hinzufügen des Autors",
    exists: "Autor existiert bereits",
    remove_failed: "Fehler beim Löschen des Autors",
    removed: "Autor gelöscht",
};

fn messages(collection: NameCollection) -> &'static Messages {
    match collection {
        NameCollection::Groups => &GROUP_MESSAGES,
        NameCollection::Authors => &AUTHOR_MESSAGES,
    }
}

async fn list_names(
    state: &AppState,
    collection: NameCollection,
) -> Result<Json<Vec<String>>, ApiError> {
    state
        .store()
        .list_names(collection)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_store(messages(collection).list_failed, e))
}

async fn add_name(
    state: &AppState,
    collection: NameCollection,
    name: String,
) -> Result<(StatusCode, Json<NameResponse>), ApiError> {
    let msgs = messages(collection);
    match state.store().add_name(collection, name.clone()).await {
        Ok(()) => {
            info!("Added {:?} to {}", name, collection.key());
            Ok((StatusCode::CREATED, Json(NameResponse { name })))
        }
        Err(StoreError::Conflict(_)) => Err(ApiError::bad_request(msgs.exists)),
        Err(e) => Err(ApiError::from_store(msgs.add_failed, e)),
    }
}

async fn remove_name(
    state: &AppState,
    collection: NameCollection,
    name: String,
) -> Result<Json<MessageResponse>, ApiError> {
    let msgs = messages(collection);
    state
        .store()
        .remove_name(collection, &name)
        .await
        .map_err(|e| ApiError::from_store(msgs.remove_failed, e))?;

    info!("Removed {:?} from {}", name, collection.key());
    Ok(Json(MessageResponse {
        message: msgs.removed.to_string(),
    }))
}

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    list_names(&state, NameCollection::Groups).await
}

pub async fn add_group(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NameBody>,
) -> Result<(StatusCode, Json<NameResponse>), ApiError> {
    add_name(&state, NameCollection::Groups, body.name.unwrap_or_default()).await
}

/// Remove a group; the path segment arrives percent-decoded
pub async fn remove_group(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    remove_name(&state, NameCollection::Groups, name).await
}

pub async fn list_authors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    list_names(&state, NameCollection::Authors).await
}

pub async fn add_author(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NameBody>,
) -> Result<(StatusCode, Json<NameResponse>), ApiError> {
    add_name(&state, NameCollection::Authors, body.name.unwrap_or_default()).await
}

pub async fn remove_author(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    remove_name(&state, NameCollection::Authors, name).await
}
