//! Streak calculator
//!
//! A streak is a run of consecutive calendar days with at least one log
//! anywhere on the shelf. `longest` is a ratchet: it only ever grows, even
//! when the logs that produced it are deleted along with their book.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
}

impl StreakState {
    /// Recompute from the distinct log dates, carrying the previous longest.
    pub fn recompute<I>(dates: I, today: NaiveDate, previous_longest: u32) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
        let current = current_run(&distinct, today);
        let longest = longest_run(&distinct).max(current).max(previous_longest);
        Self { current, longest }
    }
}

/// Length of the unbroken run of days ending today. Dates after today are
/// ignored; without a log today the run is zero.
fn current_run(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut expected = today;
    let mut run = 0;
    for &date in dates.range(..=today).rev() {
        if date != expected {
            break;
        }
        run += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    run
}

fn longest_run(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut last: Option<NaiveDate> = None;
    for &date in dates {
        run = match last {
            Some(prev) if (date - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        last = Some(date);
    }
    best
}
