//! Hand-off of a phone number to the platform's call mechanism.

use std::fmt;
use tracing::info;

/// Minimum number of digits for something we are willing to dial
const MIN_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum DialError {
    Empty,
    InvalidCharacter(char),
    TooShort(usize),
}

impl fmt::Display for DialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialError::Empty => write!(f, "phone number is empty"),
            DialError::InvalidCharacter(c) => {
                write!(f, "phone number contains invalid character '{}'", c)
            }
            DialError::TooShort(n) => write!(
                f,
                "phone number has {} digits, need at least {}",
                n, MIN_DIGITS
            ),
        }
    }
}

impl std::error::Error for DialError {}

/// Build a `tel:` URI from a display phone number.
///
/// Spaces, dashes, dots and parentheses are dropped; a leading `+` is kept.
pub fn dial_uri(phone: &str) -> Result<String, DialError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(DialError::Empty);
    }

    let mut normalized = String::with_capacity(phone.len() + 4);
    normalized.push_str("tel:");

    for (i, c) in phone.chars().enumerate() {
        match c {
            '0'..='9' => normalized.push(c),
            '+' if i == 0 => normalized.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            other => return Err(DialError::InvalidCharacter(other)),
        }
    }

    let digits = normalized.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_DIGITS {
        return Err(DialError::TooShort(digits));
    }

    Ok(normalized)
}

/// Question shown before a call is placed
pub fn confirmation_prompt(name: &str, phone: &str) -> String {
    format!("Call {} at {}?", name, phone)
}

/// Platform call mechanism
pub trait Dialer: Send + Sync {
    fn dial(&self, uri: &str);
}

/// Dialer that only records the hand-off in the log
pub struct LogDialer;

impl Dialer for LogDialer {
    fn dial(&self, uri: &str) {
        info!(uri = %uri, "Handing off call");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_us_number() {
        assert_eq!(
            dial_uri("+1 (212) 555-0142").unwrap(),
            "tel:+12125550142"
        );
    }

    #[test]
    fn test_plain_digits() {
        assert_eq!(dial_uri("911").unwrap(), "tel:911");
        assert_eq!(dial_uri(" 020.7946.0000 ").unwrap(), "tel:02079460000");
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(dial_uri(""), Err(DialError::Empty));
        assert_eq!(dial_uri("   "), Err(DialError::Empty));
        assert_eq!(dial_uri("555-CALL"), Err(DialError::InvalidCharacter('C')));
        assert_eq!(dial_uri("1+2"), Err(DialError::InvalidCharacter('+')));
        assert_eq!(dial_uri("+1"), Err(DialError::TooShort(1)));
    }

    #[test]
    fn test_confirmation_prompt() {
        assert_eq!(
            confirmation_prompt("Sarah Chen", "+1 (212) 555-0142"),
            "Call Sarah Chen at +1 (212) 555-0142?"
        );
    }
}
