//! Snapshot import/export
//!
//! Export writes every slice that matters into one JSON document. Import is
//! two steps: [`parse`] checks the whole document and produces an
//! [`ImportPlan`], then the shelf applies the plan once the user has agreed
//! to replace what they have. Nothing is touched if parsing fails.

use crate::achievements::Achievements;
use crate::activity::ActivityFeed;
use crate::book::Book;
use crate::error::{Result, ShelfError};
use crate::prefs::DailyGoal;
use crate::progress::recompute_status;
use crate::streak::StreakState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedStreaks {
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl From<StreakState> for ExportedStreaks {
    fn from(s: StreakState) -> Self {
        Self { current_streak: s.current, longest_streak: s.longest }
    }
}

impl From<ExportedStreaks> for StreakState {
    fn from(s: ExportedStreaks) -> Self {
        Self { current: s.current_streak, longest: s.longest_streak }
    }
}

/// The portable backup document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub books: Vec<Book>,
    pub streaks: ExportedStreaks,
    pub activity_feed: ActivityFeed,
    pub achievements: Achievements,
    pub daily_goal: DailyGoal,
    pub export_date: DateTime<Utc>,
}

impl ExportDocument {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShelfError::Storage(e.into()))
    }
}

/// Every section is optional on the way in; absent ones keep the current value.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingDocument {
    books: Option<Vec<Book>>,
    streaks: Option<ExportedStreaks>,
    activity_feed: Option<ActivityFeed>,
    achievements: Option<Achievements>,
    daily_goal: Option<DailyGoal>,
    export_date: Option<DateTime<Utc>>,
}

/// A fully validated document waiting to replace the live shelf.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportPlan {
    pub books: Option<Vec<Book>>,
    pub streaks: Option<StreakState>,
    pub activity: Option<ActivityFeed>,
    pub achievements: Option<Achievements>,
    pub daily_goal: Option<DailyGoal>,
    pub exported_at: Option<DateTime<Utc>>,
}

impl ImportPlan {
    /// Number of books that will replace the current ones, if the document has any.
    pub fn book_count(&self) -> Option<usize> {
        self.books.as_ref().map(Vec::len)
    }
}

pub fn parse(text: &str) -> Result<ImportPlan> {
    let incoming: IncomingDocument =
        serde_json::from_str(text).map_err(|e| ShelfError::MalformedSnapshot(e.to_string()))?;

    if incoming.books.is_none()
        && incoming.streaks.is_none()
        && incoming.activity_feed.is_none()
        && incoming.achievements.is_none()
        && incoming.daily_goal.is_none()
    {
        return Err(ShelfError::MalformedSnapshot(
            "document contains none of the expected sections".to_string(),
        ));
    }

    let books = incoming.books.map(validate_books).transpose()?;

    Ok(ImportPlan {
        books,
        streaks: incoming.streaks.map(StreakState::from),
        activity: incoming.activity_feed.map(ActivityFeed::normalized),
        achievements: incoming.achievements,
        daily_goal: incoming.daily_goal,
        exported_at: incoming.export_date,
    })
}

fn validate_books(books: Vec<Book>) -> Result<Vec<Book>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(books.len());
    for (index, mut book) in books.into_iter().enumerate() {
        let malformed = |reason: String| {
            ShelfError::MalformedSnapshot(format!("book #{}: {reason}", index + 1))
        };

        if !seen.insert(book.id) {
            return Err(malformed(format!("duplicate id {}", book.id)));
        }
        let details = book.details().validated().map_err(|e| malformed(e.to_string()))?;
        if book.logs.iter().any(|l| l.amount == 0) {
            return Err(malformed("log with zero amount".to_string()));
        }

        book.apply_details(details);
        book.sort_logs();
        recompute_status(&mut book);
        out.push(book);
    }
    Ok(out)
}
