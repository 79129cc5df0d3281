use crate::assistant::{Assistant, AssistantDesk, AssistantReply, AssistantTask};
use crate::contact::NearbyContact;
use crate::state::RadarEngine;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for assistant endpoints
#[derive(Clone)]
pub struct AssistantAppState {
    pub engine: Arc<RadarEngine>,
    pub assistant: Arc<dyn Assistant>,
    pub desk: Arc<AssistantDesk>,
}

#[derive(Deserialize, Default)]
pub struct IcebreakerRequest {
    /// What the user wants from the conversation
    #[serde(default)]
    pub intent: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResponse {
    pub contact_id: String,
    pub task: AssistantTask,
    pub reply: AssistantReply,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create assistant API router
pub fn create_assistant_router(state: AssistantAppState) -> Router {
    Router::new()
        .route("/api/contacts/:id/icebreaker", post(draft_icebreaker))
        .route("/api/contacts/:id/meetup", post(suggest_meetup))
        .route("/api/contacts/:id/assistant", get(get_replies))
        .with_state(Arc::new(state))
}

/// POST /api/contacts/:id/icebreaker - Draft an opening message
async fn draft_icebreaker(
    State(state): State<Arc<AssistantAppState>>,
    Path(id): Path<String>,
    Json(request): Json<IcebreakerRequest>,
) -> Result<Response, AssistantApiError> {
    let contact = nearby_contact(&state, &id)?;

    let task = AssistantTask::Icebreaker;
    let reply = run_task(&state, contact, task, move |assistant, contact| {
        Box::pin(async move { assistant.draft_icebreaker(&contact, &request.intent).await })
    })
    .await?;

    Ok(reply_response(id, task, reply))
}

/// POST /api/contacts/:id/meetup - Suggest a meeting point
async fn suggest_meetup(
    State(state): State<Arc<AssistantAppState>>,
    Path(id): Path<String>,
) -> Result<Response, AssistantApiError> {
    let user = state
        .engine
        .user_position()
        .ok_or(AssistantApiError::NotTracking)?;
    let contact = nearby_contact(&state, &id)?;

    let task = AssistantTask::Meetup;
    let user_location = user.to_string();
    let reply = run_task(&state, contact, task, move |assistant, contact| {
        Box::pin(async move { assistant.suggest_meetup(&contact, &user_location).await })
    })
    .await?;

    Ok(reply_response(id, task, reply))
}

/// GET /api/contacts/:id/assistant - Latest replies for a contact
async fn get_replies(
    State(state): State<Arc<AssistantAppState>>,
    Path(id): Path<String>,
) -> Result<Json<BTreeMap<AssistantTask, AssistantReply>>, AssistantApiError> {
    if state.engine.contact(&id).is_none() {
        return Err(AssistantApiError::NotFound);
    }
    Ok(Json(state.desk.replies_for(&id)))
}

fn nearby_contact(state: &AssistantAppState, id: &str) -> Result<NearbyContact, AssistantApiError> {
    match state.engine.nearby_contact(id) {
        Some(contact) => Ok(contact),
        None if state.engine.contact(id).is_some() => Err(AssistantApiError::NotNearby),
        None => Err(AssistantApiError::NotFound),
    }
}

type TaskFuture = std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<String>> + Send>>;

/// Claim the desk slot and run the request to completion.
///
/// The call runs in its own task so the outcome is recorded even if the
/// client goes away mid-request.
async fn run_task<F>(
    state: &Arc<AssistantAppState>,
    contact: NearbyContact,
    task: AssistantTask,
    call: F,
) -> Result<AssistantReply, AssistantApiError>
where
    F: FnOnce(Arc<dyn Assistant>, NearbyContact) -> TaskFuture + Send + 'static,
{
    let id = contact.contact.id.clone();
    state
        .desk
        .begin(&id, task)
        .map_err(|_| AssistantApiError::Busy)?;

    info!(contact_id = %id, task = ?task, "Assistant request started");

    let worker = Arc::clone(state);
    let worker_id = id.clone();
    let handle = tokio::spawn(async move {
        let outcome = call(Arc::clone(&worker.assistant), contact).await;
        if let Err(e) = &outcome {
            warn!(contact_id = %worker_id, task = ?task, error = %e, "Assistant request failed");
        }
        worker.desk.finish(&worker_id, task, outcome)
    });

    match handle.await {
        Ok(reply) => Ok(reply),
        Err(e) => {
            error!(contact_id = %id, error = %e, "Assistant task aborted");
            Ok(state
                .desk
                .finish(&id, task, Err(anyhow::anyhow!("assistant task aborted"))))
        }
    }
}

fn reply_response(contact_id: String, task: AssistantTask, reply: AssistantReply) -> Response {
    let status = match reply {
        AssistantReply::Failed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (
        status,
        Json(AssistantResponse {
            contact_id,
            task,
            reply,
        }),
    )
        .into_response()
}

/// Assistant API error types
#[derive(Debug)]
enum AssistantApiError {
    NotFound,
    NotNearby,
    NotTracking,
    Busy,
}

impl IntoResponse for AssistantApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AssistantApiError::NotFound => (StatusCode::NOT_FOUND, "Contact not found"),
            AssistantApiError::NotNearby => (StatusCode::NOT_FOUND, "Contact is not nearby"),
            AssistantApiError::NotTracking => (StatusCode::CONFLICT, "Tracking is not active"),
            AssistantApiError::Busy => (
                StatusCode::CONFLICT,
                "Assistant request already in progress",
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}
