pub mod driver;
pub mod narrator;
pub mod store;

use serde::{Deserialize, Serialize};

pub use narrator::Narrator;
pub use store::NarrationStore;

/// How a narration is rendered. Affects voice, rate and pitch only,
/// never the order in which items are spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Informational,
    Decision,
}

impl Default for Category {
    fn default() -> Self {
        Self::Informational
    }
}

impl Category {
    /// Spoken lead-in prepended to every utterance of this category.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Informational => "Tip: ",
            Category::Decision => "Important decision: ",
        }
    }
}

/// Ticket handed out for every accepted item, used to withdraw it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

/// Bumped each time an item becomes active. Engine callbacks carry the
/// generation they were issued for so late events can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

/// A fully composed utterance. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrationItem {
    pub id: ItemId,
    pub text: String,
    pub category: Category,
}

/// Outcome of an enqueue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Narration is muted; nothing was constructed.
    Ignored,
    /// The store was idle and the item is now active.
    Activated { id: ItemId, generation: Generation },
    /// Something is already active; the item waits at `position` (0 = next).
    Queued { id: ItemId, position: usize },
    /// The backlog is full and the new item was discarded.
    Dropped,
}

impl Enqueued {
    pub fn id(&self) -> Option<ItemId> {
        match self {
            Enqueued::Activated { id, .. } | Enqueued::Queued { id, .. } => Some(*id),
            Enqueued::Ignored | Enqueued::Dropped => None,
        }
    }
}

/// Outcome of withdrawing a previously accepted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Withdrawn {
    /// The item was active and has been cancelled.
    Cancelled(Generation),
    /// The item was still waiting and has been removed from the queue.
    Dequeued,
    /// Already spoken, superseded or flushed.
    NotFound,
}

/// Read-only view of the narration state pushed to the UI indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationSnapshot {
    pub enabled: bool,
    pub playing: bool,
    pub active_text: Option<String>,
    pub active_category: Option<Category>,
    pub generation: Option<Generation>,
    pub queued: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_to_informational() {
        assert_eq!(Category::default(), Category::Informational);
    }

    #[test]
    fn category_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Category::Decision).unwrap();
        assert_eq!(json, "\"decision\"");
        let parsed: Category = serde_json::from_str("\"informational\"").unwrap();
        assert_eq!(parsed, Category::Informational);
    }

    #[test]
    fn enqueued_exposes_ticket_only_for_accepted_items() {
        let activated = Enqueued::Activated { id: ItemId(3), generation: Generation(1) };
        assert_eq!(activated.id(), Some(ItemId(3)));
        assert_eq!(Enqueued::Queued { id: ItemId(4), position: 0 }.id(), Some(ItemId(4)));
        assert_eq!(Enqueued::Ignored.id(), None);
        assert_eq!(Enqueued::Dropped.id(), None);
    }
}
