//! Shelf - the record store
//!
//! Owns every book and the state derived from them. Each mutating call
//! validates first, applies in memory, recomputes streaks and achievements,
//! records activity and then writes the touched slices.

use crate::achievements::{Achievements, ShelfSnapshot};
use crate::activity::{ActivityEvent, ActivityFeed, ActivityKind};
use crate::book::{Book, BookDetails, BookId, Category, LogEntry, Medium, Status};
use crate::clock::{Clock, SystemClock};
use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError, ValidationError};
use crate::prefs::{DailyGoal, DailyProgress, Theme};
use crate::progress::{recompute_status, remaining};
use crate::snapshot::{self, ExportDocument, ImportPlan};
use crate::stats::Statistics;
use crate::streak::StreakState;
use crate::suggestions::{self, HiddenSuggestions};
use chrono::NaiveDate;
use log::{debug, info, warn};
use slowcore::storage::{self, load_slice_or_default, save_slice, JsonDir, ListLoad, SliceStore};
use std::path::{Path, PathBuf};

/// Slice keys in the backing store.
pub mod keys {
    pub const BOOKS: &str = "books";
    pub const STREAKS: &str = "streaks";
    pub const ACTIVITY: &str = "activityFeed";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const HIDDEN_SUGGESTIONS: &str = "hiddenSuggestions";
    pub const THEME: &str = "theme";
    pub const DAILY_GOAL: &str = "dailyGoal";
    /// Book records that could not be read back, kept verbatim.
    pub const UNREADABLE_BOOKS: &str = "unreadableBooks";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slice {
    Books,
    Streaks,
    Activity,
    Achievements,
    HiddenSuggestions,
    Theme,
    DailyGoal,
}

impl Slice {
    const ALL: [Slice; 7] = [
        Slice::Books,
        Slice::Streaks,
        Slice::Activity,
        Slice::Achievements,
        Slice::HiddenSuggestions,
        Slice::Theme,
        Slice::DailyGoal,
    ];

    /// Written after every change to the books.
    const TRACKING: [Slice; 4] = [
        Slice::Books,
        Slice::Streaks,
        Slice::Activity,
        Slice::Achievements,
    ];

    fn key(self) -> &'static str {
        match self {
            Slice::Books => keys::BOOKS,
            Slice::Streaks => keys::STREAKS,
            Slice::Activity => keys::ACTIVITY,
            Slice::Achievements => keys::ACHIEVEMENTS,
            Slice::HiddenSuggestions => keys::HIDDEN_SUGGESTIONS,
            Slice::Theme => keys::THEME,
            Slice::DailyGoal => keys::DAILY_GOAL,
        }
    }
}

pub struct Shelf<S: SliceStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    books: Vec<Book>,
    streaks: StreakState,
    activity: ActivityFeed,
    achievements: Achievements,
    hidden: HiddenSuggestions,
    theme: Theme,
    daily_goal: DailyGoal,
    /// Cleared when the stored books could not be read safely, so they are
    /// never overwritten by a partial list.
    books_writable: bool,
}

impl Shelf<JsonDir, SystemClock> {
    /// Open the shelf stored under the configured data directory.
    pub fn open(config: &ShelfConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(storage::StorageError::from)?;
        info!("opening shelf at {}", config.data_dir.display());
        Ok(Self::load(JsonDir::new(&config.data_dir), SystemClock))
    }
}

impl<S: SliceStore, C: Clock> Shelf<S, C> {
    /// Read every slice. Missing or corrupt slices start out empty. Book
    /// records that fail to read are moved to [`keys::UNREADABLE_BOOKS`]
    /// before anything can overwrite them.
    pub fn load(mut store: S, clock: C) -> Self {
        let (mut books, books_writable) = load_books(&mut store);
        for book in &mut books {
            book.sort_logs();
            recompute_status(book);
        }
        let streaks = load_slice_or_default(&store, keys::STREAKS);
        let activity =
            load_slice_or_default::<ActivityFeed, _>(&store, keys::ACTIVITY).normalized();
        let achievements = load_slice_or_default(&store, keys::ACHIEVEMENTS);
        let hidden = load_slice_or_default(&store, keys::HIDDEN_SUGGESTIONS);
        let theme = load_slice_or_default(&store, keys::THEME);
        let daily_goal = load_slice_or_default(&store, keys::DAILY_GOAL);

        let mut shelf = Self {
            store,
            clock,
            books,
            streaks,
            activity,
            achievements,
            hidden,
            theme,
            daily_goal,
            books_writable,
        };
        shelf.refresh_streaks();
        debug!("loaded {} books", shelf.books.len());
        shelf
    }

    // ---- reads ----

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn books_in(&self, category: Category) -> Vec<&Book> {
        self.books.iter().filter(|b| b.category == Some(category)).collect()
    }

    pub fn books_with_status(&self, status: Status) -> Vec<&Book> {
        self.books.iter().filter(|b| b.status == status).collect()
    }

    pub fn streaks(&self) -> StreakState {
        self.streaks
    }

    pub fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::compute(&self.books)
    }

    pub fn hidden_suggestions(&self) -> &HiddenSuggestions {
        &self.hidden
    }

    pub fn name_suggestions(&self, prefix: &str) -> Vec<String> {
        suggestions::name_suggestions(&self.books, &self.hidden, prefix)
    }

    pub fn author_suggestions(&self, prefix: &str) -> Vec<String> {
        suggestions::author_suggestions(&self.books, &self.hidden, prefix)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn daily_goal(&self) -> DailyGoal {
        self.daily_goal
    }

    /// Everything logged today across all books against the daily goal.
    pub fn daily_progress(&self) -> DailyProgress {
        let today = self.clock.today();
        let logged_today = self
            .books
            .iter()
            .flat_map(|b| &b.logs)
            .filter(|l| l.date == today)
            .map(|l| u64::from(l.amount))
            .sum();
        DailyProgress::new(self.daily_goal, logged_today)
    }

    // ---- book mutations ----

    pub fn create_book(&mut self, details: BookDetails) -> Result<BookId> {
        let details = details.validated()?;
        let id = self.next_id();
        let book = Book::new(id, details);
        let message = format!("added {} by {}", book.name, book.author);
        let name = book.name.clone();
        self.books.push(book);

        debug!("created book {id}");
        self.record(ActivityKind::BookAdded, message, Some(name));
        self.commit();
        Ok(id)
    }

    /// Log progress on a given day. Same-day logs add up.
    pub fn append_log(&mut self, id: BookId, date: NaiveDate, amount: u32) -> Result<()> {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }
        let book = self.book_mut(id)?;
        let was_completed = book.status == Status::Completed;
        book.push_log(LogEntry { date, amount });
        recompute_status(book);

        let verb = match book.medium {
            Medium::Paper => "read",
            Medium::Audio => "listened to",
        };
        let message = format!("{verb} {amount} {} of {}", book.unit(amount), book.name);
        let name = book.name.clone();
        let finished = !was_completed && book.status == Status::Completed;

        debug!("logged {amount} on {date} for book {id}");
        self.record(ActivityKind::Progress, message, Some(name.clone()));
        if finished {
            self.record(ActivityKind::Completed, format!("finished {name}"), Some(name));
        }
        self.commit();
        Ok(())
    }

    /// Log progress dated today.
    pub fn log_today(&mut self, id: BookId, amount: u32) -> Result<()> {
        let today = self.clock.today();
        self.append_log(id, today, amount)
    }

    /// Flip the completion flag and return its new value.
    ///
    /// Completing a book that is short of its target logs the remainder today.
    /// Clearing the flag never removes logs, so a book whose logs already
    /// reach the target stays completed.
    pub fn toggle_completion(&mut self, id: BookId) -> Result<bool> {
        let today = self.clock.today();
        let book = self.book_mut(id)?;
        let kind = if book.completed_flag {
            book.completed_flag = false;
            ActivityKind::Reopened
        } else {
            let left = remaining(book);
            if left > 0 {
                let amount = u32::try_from(left).unwrap_or(book.target);
                book.push_log(LogEntry { date: today, amount });
            }
            book.completed_flag = true;
            ActivityKind::Completed
        };
        recompute_status(book);

        let flag = book.completed_flag;
        let name = book.name.clone();
        let message = match kind {
            ActivityKind::Completed => format!("finished {name}"),
            _ => format!("marked {name} as not finished"),
        };

        debug!("book {id} completion flag now {flag}");
        // Logs that reach the target put the flag straight back; nothing changed.
        if kind == ActivityKind::Completed || !flag {
            self.record(kind, message, Some(name));
        }
        self.commit();
        Ok(flag)
    }

    pub fn change_category(&mut self, id: BookId, category: Option<Category>) -> Result<()> {
        let book = self.book_mut(id)?;
        book.category = category;
        let message = match category {
            Some(c) => format!("moved {} to {}", book.name, category_label(c)),
            None => format!("removed the category from {}", book.name),
        };
        let name = book.name.clone();

        self.record(ActivityKind::CategoryChanged, message, Some(name));
        self.commit();
        Ok(())
    }

    /// Overwrite a book's details. Logs stay as they are.
    pub fn edit_book(&mut self, id: BookId, details: BookDetails) -> Result<()> {
        let details = details.validated()?;
        let book = self.book_mut(id)?;
        book.apply_details(details);
        recompute_status(book);
        let name = book.name.clone();

        debug!("edited book {id}");
        self.record(ActivityKind::Edited, format!("edited {name}"), Some(name));
        self.commit();
        Ok(())
    }

    /// Remove a book and its logs for good. Callers confirm with the user first.
    pub fn delete_book(&mut self, id: BookId) -> Result<Book> {
        let index = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or(ShelfError::NotFound(id))?;
        let name = self.books[index].name.clone();
        self.record(ActivityKind::Deleted, format!("removed {name}"), Some(name));
        let book = self.books.remove(index);

        debug!("deleted book {id}");
        self.commit();
        Ok(book)
    }

    // ---- preferences ----

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist(&[Slice::Theme]);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    pub fn set_daily_goal(&mut self, goal: DailyGoal) {
        self.daily_goal = goal;
        self.persist(&[Slice::DailyGoal]);
    }

    pub fn hide_name_suggestion(&mut self, name: &str) {
        if self.hidden.hide_name(name) {
            self.persist(&[Slice::HiddenSuggestions]);
        }
    }

    pub fn hide_author_suggestion(&mut self, author: &str) {
        if self.hidden.hide_author(author) {
            self.persist(&[Slice::HiddenSuggestions]);
        }
    }

    pub fn clear_hidden_suggestions(&mut self) {
        self.hidden.clear();
        self.persist(&[Slice::HiddenSuggestions]);
    }

    // ---- snapshots ----

    /// Build the backup document and note the export in the feed.
    pub fn export(&mut self) -> ExportDocument {
        let document = ExportDocument {
            books: self.books.clone(),
            streaks: self.streaks.into(),
            activity_feed: self.activity.clone(),
            achievements: self.achievements.clone(),
            daily_goal: self.daily_goal,
            export_date: self.clock.now(),
        };

        info!("exported {} books", document.books.len());
        let message = format!("exported {} books", document.books.len());
        self.record(ActivityKind::Exported, message, None);
        self.persist(&[Slice::Activity]);
        document
    }

    pub fn export_json(&mut self) -> Result<String> {
        self.export().to_json()
    }

    pub fn export_to(&mut self, path: &Path) -> Result<()> {
        let json = self.export_json()?;
        storage::write_document(path, &json)?;
        Ok(())
    }

    /// Export into the configured backup folder, named after today.
    pub fn backup(&mut self, config: &ShelfConfig) -> Result<PathBuf> {
        let path = config.backup_path(self.clock.today());
        self.export_to(&path)?;
        Ok(path)
    }

    /// Replace the shelf with a parsed document. Sections the document lacks
    /// keep their current value.
    pub fn apply_import(&mut self, plan: ImportPlan) {
        let count = plan.book_count();
        if let Some(books) = plan.books {
            self.books = books;
            self.books_writable = true;
        }
        if let Some(streaks) = plan.streaks {
            self.streaks = streaks;
        }
        if let Some(activity) = plan.activity {
            self.activity = activity;
        }
        if let Some(achievements) = plan.achievements {
            self.achievements = achievements;
        }
        if let Some(goal) = plan.daily_goal {
            self.daily_goal = goal;
        }

        let message = match count {
            Some(n) => format!("imported {n} books from a backup"),
            None => "imported settings from a backup".to_string(),
        };
        info!("{message}");
        self.record(ActivityKind::Imported, message, None);
        self.commit();
        self.persist(&[Slice::DailyGoal]);
    }

    /// Parse and apply in one go, for callers that already confirmed.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let plan = snapshot::parse(text)?;
        self.apply_import(plan);
        Ok(())
    }

    pub fn import_from(&mut self, path: &Path) -> Result<()> {
        let text = storage::read_document(path)?;
        self.import_json(&text)
    }

    /// Write every slice now, reporting the first failure.
    pub fn flush(&mut self) -> Result<()> {
        for slice in Slice::ALL {
            self.write_slice(slice)?;
        }
        Ok(())
    }

    // ---- internals ----

    fn book_mut(&mut self, id: BookId) -> Result<&mut Book> {
        self.books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(ShelfError::NotFound(id))
    }

    /// Millisecond timestamp, bumped past any id already on the shelf. Near
    /// the top of the range it walks on (wrapping) to the first free id.
    fn next_id(&self) -> BookId {
        let stamp = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        let floor = self.books.iter().map(|b| b.id.0.saturating_add(1)).max().unwrap_or(0);
        let mut id = stamp.max(floor);
        while self.books.iter().any(|b| b.id.0 == id) {
            id = id.wrapping_add(1);
        }
        BookId(id)
    }

    fn record(&mut self, kind: ActivityKind, message: String, related_book_name: Option<String>) {
        self.activity.push(ActivityEvent {
            kind,
            message,
            related_book_name,
            timestamp: self.clock.now(),
        });
    }

    fn refresh_streaks(&mut self) {
        let dates = self.books.iter().flat_map(|b| b.logs.iter().map(|l| l.date));
        self.streaks = StreakState::recompute(dates, self.clock.today(), self.streaks.longest);
    }

    fn snapshot(&self) -> ShelfSnapshot {
        ShelfSnapshot {
            book_count: self.books.len(),
            completed_count: self.books.iter().filter(|b| b.status == Status::Completed).count(),
            current_streak: self.streaks.current,
        }
    }

    /// Derived state, achievements, then persistence.
    fn commit(&mut self) {
        self.refresh_streaks();
        let snapshot = self.snapshot();
        for rule in self.achievements.evaluate(&snapshot) {
            info!("achievement unlocked: {}", rule.id);
            self.record(
                ActivityKind::Achievement,
                format!("achievement unlocked: {}", rule.text),
                None,
            );
        }
        self.persist(&Slice::TRACKING);
    }

    /// Best effort: a failed write is logged and the in-memory state stands.
    fn persist(&mut self, slices: &[Slice]) {
        for &slice in slices {
            if let Err(e) = self.write_slice(slice) {
                warn!("failed to save {}: {e}", slice.key());
            }
        }
    }

    fn write_slice(&mut self, slice: Slice) -> storage::Result<()> {
        let key = slice.key();
        match slice {
            Slice::Books if !self.books_writable => {
                warn!("not saving {key}: the stored copy could not be read");
                Ok(())
            }
            Slice::Books => save_slice(&mut self.store, key, &self.books),
            Slice::Streaks => save_slice(&mut self.store, key, &self.streaks),
            Slice::Activity => save_slice(&mut self.store, key, &self.activity),
            Slice::Achievements => save_slice(&mut self.store, key, &self.achievements),
            Slice::HiddenSuggestions => save_slice(&mut self.store, key, &self.hidden),
            Slice::Theme => save_slice(&mut self.store, key, &self.theme),
            Slice::DailyGoal => save_slice(&mut self.store, key, &self.daily_goal),
        }
    }
}

impl<S: SliceStore + Clone, C: Clock> Shelf<S, C> {
    /// Copy of the backing store, handy for reopening in tests.
    pub fn store_snapshot(&self) -> S {
        self.store.clone()
    }
}

/// Books that read back cleanly, and whether the slice itself was readable.
fn load_books<S: SliceStore>(store: &mut S) -> (Vec<Book>, bool) {
    let ListLoad { entries, rejected } = match storage::load_list::<Book, _>(store, keys::BOOKS) {
        Ok(load) => load,
        Err(e) => {
            warn!("could not read {}, leaving it untouched: {e}", keys::BOOKS);
            return (Vec::new(), false);
        }
    };
    if !rejected.is_empty() {
        warn!("setting aside {} unreadable book records", rejected.len());
        if let Err(e) = storage::set_aside(store, keys::UNREADABLE_BOOKS, rejected) {
            warn!(
                "failed to save {}, leaving {} untouched: {e}",
                keys::UNREADABLE_BOOKS,
                keys::BOOKS
            );
            return (entries, false);
        }
    }
    (entries, true)
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::AgreementA => "agreement A",
        Category::AgreementB => "agreement B",
        Category::FreeChoice => "free choice",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::progress::{progress_percentage, total_progress};
    use slowcore::storage::MemoryStore;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dune() -> BookDetails {
        BookDetails::new("Dune", "Herbert", Medium::Paper, 400)
    }

    fn shelf_on(clock: &FixedClock) -> Shelf<MemoryStore, &FixedClock> {
        Shelf::load(MemoryStore::new(), clock)
    }

    #[test]
    fn test_create_book() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune().with_category(Category::FreeChoice)).unwrap();

        let book = shelf.book(id).unwrap();
        assert_eq!(book.status, Status::Planned);
        assert!(book.logs.is_empty());
        assert_eq!(shelf.books_in(Category::FreeChoice).len(), 1);

        // Book event plus the first-book achievement.
        let kinds: Vec<_> = shelf.activity().events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ActivityKind::Achievement, ActivityKind::BookAdded]);
        assert!(shelf.achievements().is_unlocked("first-book"));
    }

    #[test]
    fn test_create_rejects_without_side_effects() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let err = shelf.create_book(BookDetails::new("", "Herbert", Medium::Paper, 10));
        assert!(matches!(err, Err(ShelfError::Validation(ValidationError::EmptyName))));
        assert!(shelf.books().is_empty());
        assert!(shelf.activity().is_empty());
        assert_eq!(shelf.store_snapshot().keys().count(), 0);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let a = shelf.create_book(dune()).unwrap();
        let b = shelf.create_book(dune()).unwrap();
        assert_ne!(a, b);
        clock.advance_millis(5);
        let c = shelf.create_book(dune()).unwrap();
        assert!(c > b);
    }

    #[test]
    fn test_ids_past_the_top_of_the_range() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let json = format!(
            r#"{{ "books": [{{ "id": {}, "name": "Dune", "author": "Herbert", "target": 400 }}] }}"#,
            u64::MAX
        );
        shelf.import_json(&json).unwrap();

        let a = shelf.create_book(dune()).unwrap();
        let b = shelf.create_book(dune()).unwrap();
        assert_ne!(a, BookId(u64::MAX));
        assert_ne!(a, b);
        assert_ne!(b, BookId(u64::MAX));
    }

    #[test]
    fn test_log_and_progress() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.append_log(id, day("2024-01-01"), 100).unwrap();

        let book = shelf.book(id).unwrap();
        assert_eq!(total_progress(book), 100);
        assert_eq!(progress_percentage(book), 25);
        assert_eq!(remaining(book), 300);
        assert_eq!(book.status, Status::InProgress);
        assert_eq!(shelf.streaks(), StreakState { current: 1, longest: 1 });
        assert_eq!(shelf.activity().events()[0].message, "read 100 pages of Dune");
    }

    #[test]
    fn test_log_rejections() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        let before = shelf.activity().len();

        assert!(matches!(
            shelf.append_log(id, day("2024-01-01"), 0),
            Err(ShelfError::Validation(ValidationError::ZeroAmount))
        ));
        assert!(matches!(
            shelf.append_log(BookId(1), day("2024-01-01"), 5),
            Err(ShelfError::NotFound(BookId(1)))
        ));
        assert_eq!(shelf.activity().len(), before);
        assert!(shelf.book(id).unwrap().logs.is_empty());
    }

    #[test]
    fn test_logging_past_target_completes() {
        let clock = FixedClock::on(day("2024-01-01"));
        let mut shelf = shelf_on(&clock);
        let id = shelf
            .create_book(BookDetails::new("Emma", "Austen", Medium::Audio, 90))
            .unwrap();
        shelf.log_today(id, 60).unwrap();
        shelf.log_today(id, 45).unwrap();

        let book = shelf.book(id).unwrap();
        assert_eq!(book.status, Status::Completed);
        assert!(book.completed_flag);
        let messages: Vec<_> =
            shelf.activity().events().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            &messages[..3],
            &[
                "achievement unlocked: Finished your first book",
                "finished Emma",
                "listened to 45 minutes of Emma",
            ]
        );
    }

    #[test]
    fn test_toggle_completion_fills_remainder() {
        let clock = FixedClock::on(day("2024-01-05"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.append_log(id, day("2024-01-01"), 100).unwrap();

        assert!(shelf.toggle_completion(id).unwrap());
        let book = shelf.book(id).unwrap();
        assert_eq!(book.logs[0], LogEntry { date: day("2024-01-05"), amount: 300 });
        assert_eq!(total_progress(book), 400);
        assert_eq!(progress_percentage(book), 100);
        assert_eq!(book.status, Status::Completed);
    }

    #[test]
    fn test_untoggle_keeps_history() {
        let clock = FixedClock::on(day("2024-01-05"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.toggle_completion(id).unwrap();
        let total = total_progress(shelf.book(id).unwrap());

        let feed_len = shelf.activity().len();

        // Logs still reach the target, so the book completes again.
        assert!(shelf.toggle_completion(id).unwrap());
        assert_eq!(total_progress(shelf.book(id).unwrap()), total);
        assert_eq!(shelf.book(id).unwrap().status, Status::Completed);
        assert_eq!(shelf.activity().len(), feed_len);
        assert!(shelf.activity().events().iter().all(|e| e.kind != ActivityKind::Reopened));
    }

    #[test]
    fn test_untoggle_after_raising_target() {
        let clock = FixedClock::on(day("2024-01-05"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.toggle_completion(id).unwrap();

        shelf.edit_book(id, BookDetails::new("Dune", "Herbert", Medium::Paper, 800)).unwrap();
        assert_eq!(shelf.book(id).unwrap().status, Status::Completed);

        assert!(!shelf.toggle_completion(id).unwrap());
        let book = shelf.book(id).unwrap();
        assert_eq!(book.status, Status::InProgress);
        assert_eq!(total_progress(book), 400);
    }

    #[test]
    fn test_edit_does_not_touch_logs() {
        let clock = FixedClock::on(day("2024-01-05"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.log_today(id, 120).unwrap();

        let details = BookDetails::new("Dune (audio)", "Frank Herbert", Medium::Audio, 100)
            .with_cover("https://example.org/dune.jpg");
        shelf.edit_book(id, details).unwrap();

        let book = shelf.book(id).unwrap();
        assert_eq!(book.medium, Medium::Audio);
        assert_eq!(book.logs.len(), 1);
        assert_eq!(total_progress(book), 120);
        assert_eq!(book.status, Status::Completed);

        let err = shelf.edit_book(id, BookDetails::new("Dune", "Herbert", Medium::Paper, 0));
        assert!(matches!(err, Err(ShelfError::Validation(ValidationError::ZeroTarget))));
        assert_eq!(shelf.book(id).unwrap().name, "Dune (audio)");
    }

    #[test]
    fn test_change_category() {
        let clock = FixedClock::on(day("2024-01-05"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.change_category(id, Some(Category::AgreementB)).unwrap();
        assert_eq!(shelf.book(id).unwrap().category, Some(Category::AgreementB));
        assert_eq!(shelf.activity().latest().unwrap().message, "moved Dune to agreement B");

        shelf.change_category(id, None).unwrap();
        assert!(shelf.books_in(Category::AgreementB).is_empty());
        assert!(matches!(
            shelf.change_category(BookId(3), None),
            Err(ShelfError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_keeps_longest_streak() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            shelf.append_log(id, day(d), 10).unwrap();
        }
        assert_eq!(shelf.streaks(), StreakState { current: 3, longest: 3 });
        assert!(shelf.achievements().is_unlocked("streak-3"));

        let removed = shelf.delete_book(id).unwrap();
        assert_eq!(removed.name, "Dune");
        assert!(shelf.books().is_empty());
        assert_eq!(shelf.streaks(), StreakState { current: 0, longest: 3 });
        assert!(shelf.achievements().is_unlocked("streak-3"));

        let deleted = shelf.activity().latest().unwrap();
        assert_eq!(deleted.kind, ActivityKind::Deleted);
        assert_eq!(deleted.related_book_name.as_deref(), Some("Dune"));

        assert!(matches!(shelf.delete_book(id), Err(ShelfError::NotFound(_))));
    }

    #[test]
    fn test_other_book_keeps_current_streak() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        let a = shelf.create_book(dune()).unwrap();
        let b = shelf.create_book(BookDetails::new("Emma", "Austen", Medium::Paper, 300)).unwrap();
        shelf.append_log(a, day("2024-01-02"), 10).unwrap();
        shelf.append_log(a, day("2024-01-03"), 10).unwrap();
        shelf.append_log(b, day("2024-01-03"), 10).unwrap();

        shelf.delete_book(a).unwrap();
        assert_eq!(shelf.streaks(), StreakState { current: 1, longest: 2 });
    }

    #[test]
    fn test_streak_follows_the_clock_on_reload() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.append_log(id, day("2024-01-02"), 10).unwrap();
        shelf.append_log(id, day("2024-01-03"), 10).unwrap();
        let store = shelf.store_snapshot();

        clock.advance_days(2);
        let reopened = Shelf::load(store, &clock);
        assert_eq!(reopened.streaks(), StreakState { current: 0, longest: 2 });
    }

    #[test]
    fn test_reload_restores_everything() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.log_today(id, 50).unwrap();
        shelf.set_theme(Theme::Dark);
        shelf.set_daily_goal(DailyGoal(20));
        shelf.hide_author_suggestion("Herbert");

        let reopened = Shelf::load(shelf.store_snapshot(), &clock);
        assert_eq!(reopened.books(), shelf.books());
        assert_eq!(reopened.streaks(), shelf.streaks());
        assert_eq!(reopened.activity(), shelf.activity());
        assert_eq!(reopened.achievements(), shelf.achievements());
        assert_eq!(reopened.theme(), Theme::Dark);
        assert_eq!(reopened.daily_goal(), DailyGoal(20));
        assert!(reopened.author_suggestions("h").is_empty());
    }

    #[test]
    fn test_corrupt_slice_does_not_block_the_rest() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut store = MemoryStore::new();
        store.write(keys::BOOKS, "[{ broken").unwrap();
        store.write(keys::THEME, "\"dark\"").unwrap();
        let shelf = Shelf::load(store, &clock);
        assert!(shelf.books().is_empty());
        assert_eq!(shelf.theme(), Theme::Dark);

        let store = shelf.store_snapshot();
        let kept: Vec<serde_json::Value> =
            storage::load_slice(&store, keys::UNREADABLE_BOOKS).unwrap().unwrap();
        assert_eq!(kept, vec![serde_json::Value::from("[{ broken")]);
    }

    /// Every read of the books slice fails, as with a file we lack access to.
    #[derive(Clone, Default)]
    struct UnreadableBooks(MemoryStore);

    impl SliceStore for UnreadableBooks {
        fn read(&self, key: &str) -> storage::Result<Option<String>> {
            if key == keys::BOOKS {
                return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into());
            }
            self.0.read(key)
        }

        fn write(&mut self, key: &str, contents: &str) -> storage::Result<()> {
            self.0.write(key, contents)
        }

        fn remove(&mut self, key: &str) -> storage::Result<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_unreadable_books_are_never_overwritten() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = Shelf::load(UnreadableBooks::default(), &clock);
        let id = shelf.create_book(dune()).unwrap();
        shelf.log_today(id, 10).unwrap();
        assert!(shelf.flush().is_ok());

        let store = shelf.store_snapshot().0;
        assert!(store.keys().all(|k| k != keys::BOOKS));
        assert!(store.keys().any(|k| k == keys::ACTIVITY));

        // Importing a full book list is the user's way out.
        let json = shelf.export_json().unwrap();
        shelf.import_json(&json).unwrap();
        assert!(shelf.store_snapshot().0.keys().any(|k| k == keys::BOOKS));
    }

    #[test]
    fn test_bad_book_record_does_not_lose_the_others() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut store = MemoryStore::new();
        let stored = r#"[
            { "id": 1, "name": "Dune", "author": "Herbert", "target": 400,
              "logs": [{ "date": "2024-01-02", "amount": 40 }] },
            { "id": 2, "name": "Emma", "author": "Austen", "target": 300, "category": "science" },
            { "id": 3, "name": "Ulysses", "author": "Joyce", "target": 700,
              "logs": [{ "date": "not a date", "amount": 5 }] }
        ]"#;
        store.write(keys::BOOKS, stored).unwrap();

        let mut shelf = Shelf::load(store, &clock);
        let names: Vec<_> = shelf.books().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Dune", "Emma"]);
        assert_eq!(shelf.book(BookId(2)).unwrap().category, None);

        shelf.create_book(BookDetails::new("Beloved", "Morrison", Medium::Paper, 320)).unwrap();
        let reopened = Shelf::load(shelf.store_snapshot(), &clock);
        assert_eq!(reopened.books().len(), 3);
        assert_eq!(total_progress(reopened.book(BookId(1)).unwrap()), 40);

        let store = reopened.store_snapshot();
        let kept: Vec<serde_json::Value> =
            storage::load_slice(&store, keys::UNREADABLE_BOOKS).unwrap().unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["name"], "Ulysses");
    }

    #[test]
    fn test_daily_progress() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        let a = shelf.create_book(dune()).unwrap();
        let b = shelf.create_book(BookDetails::new("Emma", "Austen", Medium::Audio, 600)).unwrap();
        shelf.set_daily_goal(DailyGoal(30));
        shelf.log_today(a, 10).unwrap();
        shelf.append_log(b, day("2024-01-02"), 100).unwrap();
        assert!(!shelf.daily_progress().met);

        shelf.log_today(b, 20).unwrap();
        let progress = shelf.daily_progress();
        assert_eq!(progress.logged_today, 30);
        assert!(progress.met);
    }

    #[test]
    fn test_backup_lands_in_backup_dir() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        shelf.create_book(dune()).unwrap();

        let mut config = ShelfConfig::with_data_dir(dir.path().join("data"));
        config.backup_dir = dir.path().join("backups");
        let path = shelf.backup(&config).unwrap();
        assert_eq!(path, dir.path().join("backups").join("slowshelf-2024-01-03.json"));

        let plan = snapshot::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(plan.book_count(), Some(1));
        assert_eq!(shelf.activity().latest().unwrap().kind, ActivityKind::Exported);
    }

    #[test]
    fn test_theme_toggle_is_not_activity() {
        let clock = FixedClock::on(day("2024-01-03"));
        let mut shelf = shelf_on(&clock);
        assert_eq!(shelf.toggle_theme(), Theme::Dark);
        assert_eq!(shelf.toggle_theme(), Theme::Light);
        assert!(shelf.activity().is_empty());
    }
}
