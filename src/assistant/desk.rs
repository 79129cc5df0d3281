use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The two things the assistant can help with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantTask {
    Icebreaker,
    Meetup,
}

/// Latest state of an assistant request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssistantReply {
    Loading,
    Ready { text: String },
    Failed { error: String },
}

/// A request for this contact and task is already in flight
#[derive(Debug, Clone, PartialEq)]
pub struct DeskBusy;

impl fmt::Display for DeskBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assistant request already in progress")
    }
}

impl std::error::Error for DeskBusy {}

/// Tracks assistant replies per (contact, task).
///
/// At most one request per key is in flight; the slot stays `Loading` until
/// [`AssistantDesk::finish`] records the outcome.
#[derive(Default)]
pub struct AssistantDesk {
    replies: DashMap<(String, AssistantTask), AssistantReply>,
}

impl AssistantDesk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for a new request
    pub fn begin(&self, contact_id: &str, task: AssistantTask) -> Result<(), DeskBusy> {
        match self.replies.entry((contact_id.to_string(), task)) {
            Entry::Occupied(mut slot) => {
                if *slot.get() == AssistantReply::Loading {
                    return Err(DeskBusy);
                }
                slot.insert(AssistantReply::Loading);
            }
            Entry::Vacant(slot) => {
                slot.insert(AssistantReply::Loading);
            }
        }
        Ok(())
    }

    /// Record the outcome of a request started with [`AssistantDesk::begin`]
    pub fn finish(
        &self,
        contact_id: &str,
        task: AssistantTask,
        outcome: anyhow::Result<String>,
    ) -> AssistantReply {
        let reply = match outcome {
            Ok(text) => AssistantReply::Ready { text },
            Err(e) => AssistantReply::Failed {
                error: format!("{:#}", e),
            },
        };
        self.replies
            .insert((contact_id.to_string(), task), reply.clone());
        reply
    }

    pub fn reply(&self, contact_id: &str, task: AssistantTask) -> Option<AssistantReply> {
        self.replies
            .get(&(contact_id.to_string(), task))
            .map(|r| r.value().clone())
    }

    /// All replies recorded for a contact
    pub fn replies_for(&self, contact_id: &str) -> BTreeMap<AssistantTask, AssistantReply> {
        self.replies
            .iter()
            .filter(|entry| entry.key().0 == contact_id)
            .map(|entry| (entry.key().1, entry.value().clone()))
            .collect()
    }
}
