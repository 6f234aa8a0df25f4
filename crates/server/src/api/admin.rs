//! Admin password handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketdesk_core::StoreError;
use tracing::{info, warn};

use super::error::ApiError;
use super::extract::JsonBody;
use crate::metrics::ADMIN_AUTH_FAILURES_TOTAL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Outcome of an admin operation
#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub success: bool,
    pub message: String,
}

fn admin_response(status: StatusCode, success: bool, message: &str) -> Response {
    (
        status,
        Json(AdminResponse {
            success,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Check the admin password
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginBody>,
) -> Response {
    let candidate = body.password.as_deref().unwrap_or_default();
    match state.store().check_admin_password(candidate).await {
        Ok(true) => admin_response(StatusCode::OK, true, "Login erfolgreich"),
        Ok(false) => {
            ADMIN_AUTH_FAILURES_TOTAL.with_label_values(&["login"]).inc();
            warn!("Admin login with wrong password");
            admin_response(StatusCode::UNAUTHORIZED, false, "Falsches Passwort")
        }
        Err(e) => ApiError::from_store("Fehler beim Login", e).into_response(),
    }
}

/// Replace the admin password after verifying the old one
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<ChangePasswordBody>,
) -> Response {
    match state
        .store()
        .change_admin_password(
            body.old_password.as_deref().unwrap_or_default(),
            body.new_password.unwrap_or_default(),
        )
        .await
    {
        Ok(()) => {
            info!("Admin password changed");
            admin_response(StatusCode::OK, true, "Passwort geändert")
        }
        Err(StoreError::Unauthorized) => {
            ADMIN_AUTH_FAILURES_TOTAL
                .with_label_values(&["change_password"])
                .inc();
            warn!("Admin password change with wrong old password");
            admin_response(StatusCode::UNAUTHORIZED, false, "Falsches altes Passwort")
        }
        Err(e) => ApiError::from_store("Fehler beim Ändern des Passworts", e).into_response(),
    }
}
