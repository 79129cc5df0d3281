//! Assistant-backed helpers for approaching a nearby contact.
//!
//! The text-generation service sits behind the [`Assistant`] trait. Replies
//! are tracked per contact and task in an [`AssistantDesk`] so clients can
//! tell a pending request from a finished or failed one.

use crate::contact::NearbyContact;
use anyhow::Result;
use async_trait::async_trait;

mod desk;
mod gemini;
pub mod prompt;

pub use desk::{AssistantDesk, AssistantReply, AssistantTask, DeskBusy};
pub use gemini::GeminiAssistant;

/// Text-generation service
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Draft an opening message for `contact` given what the user wants
    async fn draft_icebreaker(&self, contact: &NearbyContact, intent: &str) -> Result<String>;

    /// Suggest a place to meet `contact`; `user_location` is preformatted
    async fn suggest_meetup(&self, contact: &NearbyContact, user_location: &str) -> Result<String>;
}

/// Assistant used when no API key is configured; every call fails
pub struct DisabledAssistant;

#[async_trait]
impl Assistant for DisabledAssistant {
    async fn draft_icebreaker(&self, _contact: &NearbyContact, _intent: &str) -> Result<String> {
        anyhow::bail!("assistant is not configured")
    }

    async fn suggest_meetup(&self, _contact: &NearbyContact, _user_location: &str) -> Result<String> {
        anyhow::bail!("assistant is not configured")
    }
}
