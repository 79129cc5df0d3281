//! Device position acquisition.
//!
//! Providers report the user's position or fail. [`locate`] bounds the
//! request with a timeout and substitutes a fallback coordinate, so tracking
//! can always start.

use crate::geo::Coordinate;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

mod http;

pub use http::HttpPositionProvider;

/// Why a position could not be obtained
#[derive(Debug, Clone, PartialEq)]
pub enum LocateError {
    PermissionDenied,
    Unavailable(String),
    TimedOut,
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::PermissionDenied => write!(f, "location permission denied"),
            LocateError::Unavailable(reason) => write!(f, "position unavailable: {}", reason),
            LocateError::TimedOut => write!(f, "position request timed out"),
        }
    }
}

impl std::error::Error for LocateError {}

/// Source of the user's current position
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    async fn current_position(&self) -> Result<Coordinate, LocateError>;
}

/// Position reported by the client (e.g. a browser geolocation result)
pub struct ReportedPosition(pub Coordinate);

#[async_trait]
impl PositionProvider for ReportedPosition {
    fn name(&self) -> &str {
        "reported"
    }

    async fn current_position(&self) -> Result<Coordinate, LocateError> {
        Ok(self.0)
    }
}

/// Provider used when no position source is configured
pub struct UnavailablePosition;

#[async_trait]
impl PositionProvider for UnavailablePosition {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn current_position(&self) -> Result<Coordinate, LocateError> {
        Err(LocateError::PermissionDenied)
    }
}

/// Where a tracking position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    Device,
    Fallback,
}

/// A resolved user position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFix {
    pub position: Coordinate,
    pub source: PositionSource,
}

/// Ask `provider` for a position, falling back to `fallback` on failure or
/// after `timeout`.
pub async fn locate(
    provider: &dyn PositionProvider,
    timeout: Duration,
    fallback: Coordinate,
) -> PositionFix {
    let result = match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(LocateError::TimedOut),
    };

    match result {
        Ok(position) => {
            info!(provider = provider.name(), position = %position, "Position acquired");
            PositionFix {
                position,
                source: PositionSource::Device,
            }
        }
        Err(e) => {
            warn!(
                provider = provider.name(),
                error = %e,
                fallback = %fallback,
                "Position unavailable, using fallback"
            );
            PositionFix {
                position: fallback,
                source: PositionSource::Fallback,
            }
        }
    }
}
