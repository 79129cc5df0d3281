use super::{default_avatar, Contact};
use crate::geo::Coordinate;
use chrono::Utc;

/// Demo roster scattered around lower Manhattan.
///
/// Most entries sit within a few hundred metres of the default fallback
/// position; one registered contact is across the river in New Jersey so the
/// radar always has something just out of range.
pub fn demo_roster() -> Vec<Contact> {
    let now = Utc::now();
    let entries: [(&str, &str, &str, f64, f64, bool); 7] = [
        ("c-001", "Sarah Chen", "+1 (212) 555-0142", 40.7145, -74.0075, true),
        ("c-002", "Marcus Johnson", "+1 (212) 555-0187", 40.7110, -74.0020, true),
        ("c-003", "Priya Patel", "+1 (646) 555-0133", 40.7180, -74.0100, true),
        ("c-004", "Diego Alvarez", "+1 (917) 555-0111", 40.7090, -74.0110, false),
        ("c-005", "Emma Larsen", "+1 (347) 555-0176", 40.7205, -73.9985, true),
        ("c-006", "Tom Becker", "+1 (718) 555-0164", 40.7060, -74.0150, false),
        ("c-007", "Aisha Okafor", "+1 (201) 555-0198", 40.8000, -74.2000, true),
    ];

    entries
        .into_iter()
        .map(|(id, name, phone, lat, lon, registered)| Contact {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            avatar: default_avatar(name),
            position: Coordinate::new(lat, lon),
            registered,
            last_seen: now,
        })
        .collect()
}
