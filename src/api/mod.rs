// HTTP and WebSocket APIs

pub mod assistant;
pub mod contacts;
pub mod tracking;
pub mod websocket;

pub use assistant::{create_assistant_router, AssistantAppState};
pub use contacts::{create_contacts_router, ContactsAppState};
pub use tracking::{create_tracking_router, TrackingAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::assistant::{Assistant, AssistantDesk};
use crate::config::ApiConfig;
use crate::state::RadarEngine;
use crate::telephony::Dialer;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Collaborators the HTTP surface is built from
pub struct AppParts {
    pub engine: Arc<RadarEngine>,
    pub assistant: Arc<dyn Assistant>,
    pub dialer: Arc<dyn Dialer>,
}

/// Merge every router into the full application
pub fn create_app(parts: AppParts, api: &ApiConfig) -> Router {
    let desk = Arc::new(AssistantDesk::new());

    Router::new()
        .merge(create_contacts_router(ContactsAppState {
            engine: Arc::clone(&parts.engine),
            dialer: parts.dialer,
        }))
        .merge(create_tracking_router(TrackingAppState {
            engine: Arc::clone(&parts.engine),
            default_surface_px: api.radar_size_px,
            default_padding_px: api.radar_padding_px,
        }))
        .merge(create_assistant_router(AssistantAppState {
            engine: Arc::clone(&parts.engine),
            assistant: parts.assistant,
            desk,
        }))
        .merge(create_ws_router(Arc::new(WsAppState {
            engine: parts.engine,
        })))
        .layer(CorsLayer::permissive())
}
