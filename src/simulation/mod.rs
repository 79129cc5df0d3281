use crate::contact::{Contact, NearbyContact};
use crate::geo::{distance_km, round_km, Coordinate};
use chrono::{DateTime, Utc};
use rand::Rng;


/// Parameters for one simulation tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Proximity scan radius in kilometres (inclusive)
    pub radius_km: f64,
    /// Full width of the per-tick random walk in degrees; each axis moves by
    /// at most half of this in either direction
    pub jitter_degrees: f64,
}

/// Result of one tick
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Full roster with updated positions; replaces the caller's state
    pub contacts: Vec<Contact>,
    /// Registered contacts within the radius, in roster order
    pub nearby: Vec<NearbyContact>,
}

/// Advance the simulated world by one tick.
///
/// Registered contacts drift by independent uniform offsets on each axis and
/// have `last_seen` refreshed to `now`. Everyone else is passed through
/// untouched. The nearby set is then derived from the updated positions.
pub fn step<R: Rng>(
    contacts: &[Contact],
    user: Coordinate,
    params: &SimulationParams,
    rng: &mut R,
    now: DateTime<Utc>,
) -> StepOutcome {
    let half = params.jitter_degrees.abs() / 2.0;

    let contacts: Vec<Contact> = contacts
        .iter()
        .map(|contact| {
            if !contact.registered {
                return contact.clone();
            }
            let (d_lat, d_lon) = if half > 0.0 && half.is_finite() {
                (rng.gen_range(-half..=half), rng.gen_range(-half..=half))
            } else {
                (0.0, 0.0)
            };
            Contact {
                position: contact.position.jittered(d_lat, d_lon),
                last_seen: now,
                ..contact.clone()
            }
        })
        .collect();

    let nearby = nearby_contacts(&contacts, user, params.radius_km);

    StepOutcome { contacts, nearby }
}

/// Registered contacts whose distance to `user` is at most `radius_km`.
///
/// Classification uses the exact distance; the stored distance is rounded
/// for display.
pub fn nearby_contacts(
    contacts: &[Contact],
    user: Coordinate,
    radius_km: f64,
) -> Vec<NearbyContact> {
    contacts
        .iter()
        .filter(|c| c.registered)
        .filter_map(|c| {
            let distance = distance_km(user, c.position);
            (distance <= radius_km).then(|| NearbyContact {
                contact: c.clone(),
                distance_km: round_km(distance),
            })
        })
        .collect()
}
