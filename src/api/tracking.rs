use crate::contact::NearbyContact;
use crate::geo::Coordinate;
use crate::location::{PositionFix, PositionProvider, ReportedPosition};
use crate::radar::{RadarBlip, RadarSurface};
use crate::state::{RadarEngine, TrackingError, TrackingStatus};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for tracking and radar endpoints
#[derive(Clone)]
pub struct TrackingAppState {
    pub engine: Arc<RadarEngine>,
    /// Surface used when /api/radar is called without dimensions
    pub default_surface_px: f64,
    pub default_padding_px: f64,
}

/// Optional position reported by the client when starting
#[derive(Deserialize, Default)]
pub struct StartRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    pub status: TrackingStatus,
    pub fix: Option<PositionFix>,
    pub tracking_since: Option<DateTime<Utc>>,
    pub ticks: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResponse {
    pub status: TrackingStatus,
    pub was_tracking: bool,
}

/// Query parameters for radar projection
#[derive(Deserialize)]
pub struct RadarQuery {
    pub size: Option<f64>,
    pub padding: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarResponse {
    pub surface: RadarSurface,
    pub radius_km: f64,
    pub blips: Vec<RadarBlip>,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create tracking API router
pub fn create_tracking_router(state: TrackingAppState) -> Router {
    Router::new()
        .route("/api/tracking", get(get_tracking))
        .route("/api/tracking/start", post(start_tracking))
        .route("/api/tracking/stop", post(stop_tracking))
        .route("/api/nearby", get(list_nearby))
        .route("/api/radar", get(get_radar))
        .with_state(Arc::new(state))
}

/// GET /api/tracking - Current tracking status
async fn get_tracking(State(state): State<Arc<TrackingAppState>>) -> Json<TrackingResponse> {
    let snapshot = state.engine.snapshot();
    Json(TrackingResponse {
        status: snapshot.status,
        fix: snapshot.fix,
        tracking_since: snapshot.tracking_since,
        ticks: snapshot.ticks,
    })
}

/// POST /api/tracking/start - Begin tracking
///
/// Body is optional. When it carries `latitude` and `longitude` (a browser
/// geolocation result) that position is used; otherwise the server-side
/// provider is asked, with fallback.
async fn start_tracking(
    State(state): State<Arc<TrackingAppState>>,
    body: Bytes,
) -> Result<Json<PositionFix>, TrackingApiError> {
    let provider = reported_provider(&body)?;

    let fix = state
        .engine
        .start_tracking(provider)
        .await
        .map_err(TrackingApiError::Superseded)?;

    Ok(Json(fix))
}

fn reported_provider(body: &[u8]) -> Result<Option<Arc<dyn PositionProvider>>, TrackingApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let request: StartRequest = serde_json::from_slice(body)
        .map_err(|e| TrackingApiError::BadRequest(e.to_string()))?;

    match (request.latitude, request.longitude) {
        (Some(lat), Some(lon)) => {
            let provider: Arc<dyn PositionProvider> =
                Arc::new(ReportedPosition(Coordinate::new(lat, lon)));
            Ok(Some(provider))
        }
        (None, None) => Ok(None),
        _ => Err(TrackingApiError::BadRequest(
            "latitude and longitude must be given together".to_string(),
        )),
    }
}

/// POST /api/tracking/stop - Stop tracking
async fn stop_tracking(State(state): State<Arc<TrackingAppState>>) -> Json<StopResponse> {
    let was_tracking = state.engine.stop_tracking();
    Json(StopResponse {
        status: TrackingStatus::Idle,
        was_tracking,
    })
}

/// GET /api/nearby - Nearby set from the latest tick
async fn list_nearby(State(state): State<Arc<TrackingAppState>>) -> Json<Vec<NearbyContact>> {
    Json(state.engine.nearby())
}

/// GET /api/radar - Nearby contacts projected onto the radar disc
///
/// Query parameters:
/// - `size`: surface edge length in pixels
/// - `padding`: inset of the disc from the edge in pixels
async fn get_radar(
    State(state): State<Arc<TrackingAppState>>,
    Query(params): Query<RadarQuery>,
) -> Result<Json<RadarResponse>, TrackingApiError> {
    let size = params.size.unwrap_or(state.default_surface_px);
    let padding = params.padding.unwrap_or(state.default_padding_px);
    if !(size.is_finite() && size > 0.0) || !(padding.is_finite() && padding >= 0.0) {
        return Err(TrackingApiError::BadRequest(
            "size must be positive and padding non-negative".to_string(),
        ));
    }

    let surface = RadarSurface::square(size, padding);
    let blips = state
        .engine
        .radar(&surface)
        .ok_or(TrackingApiError::NotTracking)?;

    Ok(Json(RadarResponse {
        surface,
        radius_km: state.engine.radius_km(),
        blips,
    }))
}

/// Tracking API error types
#[derive(Debug)]
enum TrackingApiError {
    BadRequest(String),
    NotTracking,
    Superseded(TrackingError),
}

impl IntoResponse for TrackingApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            TrackingApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            TrackingApiError::NotTracking => {
                (StatusCode::CONFLICT, "Tracking is not active".to_string())
            }
            TrackingApiError::Superseded(e) => (StatusCode::CONFLICT, e.to_string()),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
