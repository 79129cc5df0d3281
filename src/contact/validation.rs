use super::{default_avatar, Contact, NewContact};
use crate::geo::Coordinate;
use chrono::Utc;
use std::fmt;
use uuid::Uuid;

/// Validation errors for NewContact
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingName,
    MissingPhone,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingName => write!(f, "name is required"),
            ValidationError::MissingPhone => write!(f, "phone is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a new contact and builds the roster entry.
///
/// Validation rules:
/// - Required fields: name, phone (whitespace-only counts as empty)
/// - Position: defaults to `origin` when not provided
/// - Avatar: generated from the name when not provided
/// - Id: fresh UUIDv7
pub fn validate_new_contact(
    new: NewContact,
    origin: Coordinate,
) -> Result<Contact, ValidationError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    let phone = new.phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::MissingPhone);
    }

    let avatar = match new.avatar {
        Some(a) if !a.trim().is_empty() => a,
        _ => default_avatar(name),
    };

    Ok(Contact {
        id: Uuid::now_v7().to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        avatar,
        position: new.position.unwrap_or(origin),
        registered: new.registered,
        last_seen: Utc::now(),
    })
}
