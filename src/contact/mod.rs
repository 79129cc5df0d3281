use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod seed;
mod validation;
#[cfg(test)]
mod tests;

pub use seed::demo_roster;
pub use validation::{validate_new_contact, ValidationError};

/// A person on the radar roster.
///
/// Only `registered` contacts take part in the simulated network: they drift
/// on every tick and can show up in the nearby set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Opaque unique identifier (UUIDv7 for contacts added at runtime)
    pub id: String,

    pub name: String,

    pub phone: String,

    /// Avatar image URL
    pub avatar: String,

    pub position: Coordinate,

    /// Participant in the simulated network
    pub registered: bool,

    pub last_seen: DateTime<Utc>,
}

/// A registered contact within the radius of the user, as of one tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyContact {
    #[serde(flatten)]
    pub contact: Contact,

    /// Distance from the user, rounded for display
    pub distance_km: f64,
}

/// Request body for adding a contact
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub position: Option<Coordinate>,
    #[serde(default)]
    pub registered: bool,
}

/// Proximity alert record.
///
/// Nothing raises alerts yet; the shape is kept so clients can rely on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub contact_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Avatar used when a new contact does not bring one
pub(crate) fn default_avatar(name: &str) -> String {
    format!(
        "https://api.dicebear.com/7.x/initials/svg?seed={}",
        name.trim().replace(' ', "+")
    )
}
