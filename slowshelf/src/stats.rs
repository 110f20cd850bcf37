//! Statistics roll-up over the whole shelf

use crate::book::{Book, Category, Medium, Status};
use crate::progress::total_progress;
use std::fmt;

/// Listening time split for display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListeningTime {
    pub hours: u64,
    pub minutes: u64,
}

impl ListeningTime {
    pub fn from_minutes(total: u64) -> Self {
        Self { hours: total / 60, minutes: total % 60 }
    }

    pub fn total_minutes(&self) -> u64 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for ListeningTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total_books: usize,
    pub completed: usize,
    pub pages_read: u64,
    pub listening: ListeningTime,
    pub by_status: Vec<(Status, usize)>,
    /// Books without a category are not counted here.
    pub by_category: Vec<(Category, usize)>,
}

impl Statistics {
    pub fn compute(books: &[Book]) -> Self {
        let mut pages_read = 0;
        let mut audio_minutes = 0;
        for book in books {
            match book.medium {
                Medium::Paper => pages_read += total_progress(book),
                Medium::Audio => audio_minutes += total_progress(book),
            }
        }

        let by_status = Status::ALL
            .iter()
            .map(|&s| (s, books.iter().filter(|b| b.status == s).count()))
            .collect();
        let by_category = Category::ALL
            .iter()
            .map(|&c| (c, books.iter().filter(|b| b.category == Some(c)).count()))
            .collect();

        Self {
            total_books: books.len(),
            completed: books.iter().filter(|b| b.status == Status::Completed).count(),
            pages_read,
            listening: ListeningTime::from_minutes(audio_minutes),
            by_status,
            by_category,
        }
    }

    pub fn count_with_status(&self, status: Status) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}
