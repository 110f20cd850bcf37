//! Progress engine - derived numbers for a single book

use crate::book::{Book, Status};

/// Sum of every logged amount.
pub fn total_progress(book: &Book) -> u64 {
    book.logs.iter().map(|l| u64::from(l.amount)).sum()
}

/// Rounded percentage of the target. Zero when there is no target.
///
/// 100 means the target is reached: a book just short of it tops out at 99
/// instead of rounding up.
pub fn progress_percentage(book: &Book) -> u8 {
    if book.target == 0 {
        return 0;
    }
    let total = total_progress(book);
    let target = u64::from(book.target);
    if total >= target {
        return 100;
    }
    // Round half up without going through floats.
    let pct = (total * 200 + target) / (target * 2);
    pct.min(99) as u8
}

/// What is left to reach the target, never negative.
pub fn remaining(book: &Book) -> u64 {
    u64::from(book.target).saturating_sub(total_progress(book))
}

/// Re-derive status from the logs.
///
/// Reaching the target completes the book and raises the completion flag.
/// A raised flag keeps the book completed even when the logs fall short.
pub fn recompute_status(book: &mut Book) {
    let total = total_progress(book);
    book.status = if total >= u64::from(book.target) && book.target > 0 {
        book.completed_flag = true;
        Status::Completed
    } else if book.completed_flag {
        Status::Completed
    } else if total == 0 {
        Status::Planned
    } else {
        Status::InProgress
    };
}
