use super::*;
use chrono::TimeZone;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_demo_roster_ids_unique() {
    let roster = demo_roster();
    let ids: HashSet<&str> = roster.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), roster.len());
}

#[test]
fn test_demo_roster_mixes_participants() {
    let roster = demo_roster();
    assert!(roster.iter().any(|c| c.registered));
    assert!(roster.iter().any(|c| !c.registered));
}

#[test]
fn test_contact_serializes_camel_case() {
    let contact = Contact {
        id: "c-1".to_string(),
        name: "Sarah".to_string(),
        phone: "+1 555".to_string(),
        avatar: "a.png".to_string(),
        position: Coordinate::new(1.0, 2.0),
        registered: true,
        last_seen: Utc.timestamp_opt(0, 0).unwrap(),
    };

    let value = serde_json::to_value(&contact).unwrap();
    assert_eq!(value["lastSeen"], json!("1970-01-01T00:00:00Z"));
    assert_eq!(value["position"]["latitude"], json!(1.0));
    assert_eq!(value["registered"], json!(true));
}

#[test]
fn test_nearby_contact_flattens() {
    let nearby = NearbyContact {
        contact: demo_roster().remove(0),
        distance_km: 0.23,
    };

    let value = serde_json::to_value(&nearby).unwrap();
    assert_eq!(value["id"], json!("c-001"));
    assert_eq!(value["distanceKm"], json!(0.23));
}

#[test]
fn test_new_contact_deserialization_minimal() {
    let new: NewContact =
        serde_json::from_str(r#"{"name": "Dana", "phone": "555"}"#).unwrap();
    assert_eq!(new.name, "Dana");
    assert!(new.position.is_none());
    assert!(!new.registered);
}

#[test]
fn test_alert_round_trips() {
    let alert = Alert {
        id: "a-1".to_string(),
        contact_id: "c-001".to_string(),
        message: "Sarah is nearby".to_string(),
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        read: false,
    };

    let json = serde_json::to_string(&alert).unwrap();
    assert!(json.contains("\"contactId\":\"c-001\""));
    let back: Alert = serde_json::from_str(&json).unwrap();
    assert_eq!(back, alert);
}
