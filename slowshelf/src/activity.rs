//! Activity feed - what happened on the shelf, newest first

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events kept in the feed. Older ones fall off the end.
pub const ACTIVITY_LIMIT: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    BookAdded,
    Progress,
    Completed,
    Reopened,
    Edited,
    CategoryChanged,
    Deleted,
    Achievement,
    Imported,
    Exported,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub message: String,
    /// Name of the book at the time of the event. Survives the book's deletion.
    #[serde(default)]
    pub related_book_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityFeed {
    events: Vec<ActivityEvent>,
}

impl ActivityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ActivityEvent) {
        self.events.insert(0, event);
        self.events.truncate(ACTIVITY_LIMIT);
    }

    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn latest(&self) -> Option<&ActivityEvent> {
        self.events.first()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Enforce the size bound on a feed that came from storage or an import.
    pub fn normalized(mut self) -> Self {
        self.events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.events.truncate(ACTIVITY_LIMIT);
        self
    }
}
