use crate::contact::{Contact, NearbyContact};
use crate::geo::Coordinate;
use crate::location::PositionFix;
use crate::state::{RadarSnapshot, RadarUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Only forward ticks that involve these contacts
    #[serde(rename = "watch")]
    Watch { contact_id: String },
    #[serde(rename = "unwatch")]
    Unwatch { contact_id: String },
    /// Ask for a full snapshot
    #[serde(rename = "snapshot")]
    Snapshot,
}

/// Server → Client messages
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Snapshot {
        snapshot: RadarSnapshot,
    },
    TrackingStarted {
        fix: PositionFix,
        timestamp: DateTime<Utc>,
    },
    RadarTick {
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
    Error {
        error: String,
    },
}

impl From<RadarUpdate> for ServerMessage {
    fn from(update: RadarUpdate) -> Self {
        match update {
            RadarUpdate::TrackingStarted { fix, timestamp } => {
                ServerMessage::TrackingStarted { fix, timestamp }
            }
            RadarUpdate::Tick {
                tick,
                user_position,
                nearby,
                timestamp,
            } => ServerMessage::RadarTick {
                tick,
                user_position,
                nearby,
                timestamp,
            },
            RadarUpdate::TrackingStopped { timestamp } => {
                ServerMessage::TrackingStopped { timestamp }
            }
            RadarUpdate::ContactAdded { contact, timestamp } => {
                ServerMessage::ContactAdded { contact, timestamp }
            }
        }
    }
}

impl From<RadarSnapshot> for ServerMessage {
    fn from(snapshot: RadarSnapshot) -> Self {
        ServerMessage::Snapshot { snapshot }
    }
}

impl ServerMessage {
    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage::Error {
            error: error.into(),
        }
    }
}
