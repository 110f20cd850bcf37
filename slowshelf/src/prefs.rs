//! Small user preferences stored next to the books

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Units (pages or minutes) to log per day. Zero means no goal is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyGoal(pub u32);

impl DailyGoal {
    pub fn is_set(self) -> bool {
        self.0 > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyProgress {
    pub goal: DailyGoal,
    pub logged_today: u64,
    pub met: bool,
}

impl DailyProgress {
    pub fn new(goal: DailyGoal, logged_today: u64) -> Self {
        Self {
            goal,
            logged_today,
            met: goal.is_set() && logged_today >= u64::from(goal.0),
        }
    }
}
