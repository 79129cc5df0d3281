use crate::contact::{Contact, NewContact};
use crate::state::RadarEngine;
use crate::telephony::{confirmation_prompt, dial_uri, Dialer};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared state for the contacts API
#[derive(Clone)]
pub struct ContactsAppState {
    pub engine: Arc<RadarEngine>,
    pub dialer: Arc<dyn Dialer>,
}

/// Call request; nothing is dialled unless `confirm` is true
#[derive(Deserialize, Default)]
pub struct CallRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallResponse {
    ConfirmationRequired { prompt: String },
    Dialing { uri: String },
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create contacts API router
pub fn create_contacts_router(state: ContactsAppState) -> Router {
    Router::new()
        .route("/api/contacts", get(list_contacts).post(add_contact))
        .route("/api/contacts/:id", get(get_contact))
        .route("/api/contacts/:id/call", post(call_contact))
        .with_state(Arc::new(state))
}

/// GET /api/contacts - Full roster in insertion order
async fn list_contacts(State(state): State<Arc<ContactsAppState>>) -> Json<Vec<Contact>> {
    Json(state.engine.contacts())
}

/// GET /api/contacts/:id
async fn get_contact(
    State(state): State<Arc<ContactsAppState>>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ContactsError> {
    state
        .engine
        .contact(&id)
        .map(Json)
        .ok_or(ContactsError::NotFound)
}

/// POST /api/contacts - Add a contact
///
/// Empty name or phone is rejected and the roster is left unchanged.
async fn add_contact(
    State(state): State<Arc<ContactsAppState>>,
    Json(new): Json<NewContact>,
) -> Result<(StatusCode, Json<Contact>), ContactsError> {
    let contact = state
        .engine
        .add_contact(new)
        .map_err(|e| ContactsError::Validation(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// POST /api/contacts/:id/call - Confirm, then hand the number to the dialer
async fn call_contact(
    State(state): State<Arc<ContactsAppState>>,
    Path(id): Path<String>,
    Json(request): Json<CallRequest>,
) -> Result<Json<CallResponse>, ContactsError> {
    let contact = state.engine.contact(&id).ok_or(ContactsError::NotFound)?;

    let uri = dial_uri(&contact.phone).map_err(|e| ContactsError::Validation(e.to_string()))?;

    if !request.confirm {
        return Ok(Json(CallResponse::ConfirmationRequired {
            prompt: confirmation_prompt(&contact.name, &contact.phone),
        }));
    }

    info!(contact_id = %contact.id, "Placing call");
    state.dialer.dial(&uri);

    Ok(Json(CallResponse::Dialing { uri }))
}

/// Contacts API error types
#[derive(Debug)]
enum ContactsError {
    NotFound,
    Validation(String),
}

impl IntoResponse for ContactsError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ContactsError::NotFound => (StatusCode::NOT_FOUND, "Contact not found".to_string()),
            ContactsError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
