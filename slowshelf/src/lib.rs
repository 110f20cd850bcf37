//! slowShelf: a reading tracker for the slow computer
//!
//! Keeps a shelf of books, the pages or minutes logged against each, and the
//! numbers derived from them: progress, reading streaks, achievements and
//! totals. Everything is stored locally as small JSON slices.

pub mod achievements;
pub mod activity;
pub mod book;
pub mod clock;
pub mod config;
mod error;
pub mod prefs;
pub mod progress;
pub mod shelf;
pub mod snapshot;
pub mod stats;
pub mod streak;
pub mod suggestions;

pub use book::{Book, BookDetails, BookId, Category, LogEntry, Medium, Status};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ShelfConfig;
pub use error::{Result, ShelfError, ValidationError};
pub use shelf::Shelf;
pub use streak::StreakState;
