//! Achievement evaluator
//!
//! The catalog is fixed. Only the unlock flags are persisted, and a flag
//! never goes back to false once set.

use serde::{Deserialize, Serialize};

/// Global numbers the rules look at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShelfSnapshot {
    pub book_count: usize,
    pub completed_count: usize,
    pub current_streak: u32,
}

pub struct AchievementRule {
    pub id: &'static str,
    pub text: &'static str,
    pub unlocked_by: fn(&ShelfSnapshot) -> bool,
}

pub const CATALOG: &[AchievementRule] = &[
    AchievementRule {
        id: "first-book",
        text: "Added your first book",
        unlocked_by: |s: &ShelfSnapshot| s.book_count >= 1,
    },
    AchievementRule {
        id: "bookshelf",
        text: "Ten books on the shelf",
        unlocked_by: |s: &ShelfSnapshot| s.book_count >= 10,
    },
    AchievementRule {
        id: "first-finish",
        text: "Finished your first book",
        unlocked_by: |s: &ShelfSnapshot| s.completed_count >= 1,
    },
    AchievementRule {
        id: "five-finished",
        text: "Finished five books",
        unlocked_by: |s: &ShelfSnapshot| s.completed_count >= 5,
    },
    AchievementRule {
        id: "ten-finished",
        text: "Finished ten books",
        unlocked_by: |s: &ShelfSnapshot| s.completed_count >= 10,
    },
    AchievementRule {
        id: "streak-3",
        text: "Read three days in a row",
        unlocked_by: |s: &ShelfSnapshot| s.current_streak >= 3,
    },
    AchievementRule {
        id: "streak-7",
        text: "Read a full week in a row",
        unlocked_by: |s: &ShelfSnapshot| s.current_streak >= 7,
    },
    AchievementRule {
        id: "streak-30",
        text: "Read thirty days in a row",
        unlocked_by: |s: &ShelfSnapshot| s.current_streak >= 30,
    },
];

pub fn rule(id: &str) -> Option<&'static AchievementRule> {
    CATALOG.iter().find(|r| r.id == id)
}

/// Persisted unlock flag for one catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub unlocked: bool,
}

/// Unlock table, always one entry per catalog rule in catalog order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Achievement>", into = "Vec<Achievement>")]
pub struct Achievements {
    entries: Vec<Achievement>,
}

impl Default for Achievements {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

/// Unknown ids are dropped and missing ids start locked.
impl From<Vec<Achievement>> for Achievements {
    fn from(stored: Vec<Achievement>) -> Self {
        let entries = CATALOG
            .iter()
            .map(|rule| Achievement {
                id: rule.id.to_string(),
                unlocked: stored.iter().any(|a| a.id == rule.id && a.unlocked),
            })
            .collect();
        Self { entries }
    }
}

impl From<Achievements> for Vec<Achievement> {
    fn from(achievements: Achievements) -> Self {
        achievements.entries
    }
}

impl Achievements {
    pub fn entries(&self) -> &[Achievement] {
        &self.entries
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.entries.iter().any(|a| a.id == id && a.unlocked)
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|a| a.unlocked).count()
    }

    /// Check every locked rule and flip the ones that now hold. Returns the
    /// newly unlocked rules in catalog order.
    pub fn evaluate(&mut self, snapshot: &ShelfSnapshot) -> Vec<&'static AchievementRule> {
        let mut unlocked = Vec::new();
        for (entry, rule) in self.entries.iter_mut().zip(CATALOG) {
            if !entry.unlocked && (rule.unlocked_by)(snapshot) {
                entry.unlocked = true;
                unlocked.push(rule);
            }
        }
        unlocked
    }
}
