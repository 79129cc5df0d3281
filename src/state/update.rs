use crate::contact::{Contact, NearbyContact};
use crate::geo::Coordinate;
use crate::location::PositionFix;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tracking state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Idle,
    Tracking,
}

/// Read-only view of the engine state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSnapshot {
    pub status: TrackingStatus,
    pub fix: Option<PositionFix>,
    pub tracking_since: Option<DateTime<Utc>>,
    pub contacts: Vec<Contact>,
    pub nearby: Vec<NearbyContact>,
    /// Ticks applied in the current tracking session
    pub ticks: u64,
}

/// Change broadcast to subscribers
#[derive(Debug, Clone)]
pub enum RadarUpdate {
    TrackingStarted {
        fix: PositionFix,
        timestamp: DateTime<Utc>,
    },
    Tick {
        tick: u64,
        user_position: Coordinate,
        nearby: Vec<NearbyContact>,
        timestamp: DateTime<Utc>,
    },
    TrackingStopped {
        timestamp: DateTime<Utc>,
    },
    ContactAdded {
        contact: Contact,
        timestamp: DateTime<Utc>,
    },
}
