//! Book records and their reading logs

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable identifier, assigned once at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Paper books count pages, audio books count minutes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    #[default]
    Paper,
    Audio,
}

impl Medium {
    pub fn unit(self, amount: u32) -> &'static str {
        match (self, amount) {
            (Medium::Paper, 1) => "page",
            (Medium::Paper, _) => "pages",
            (Medium::Audio, 1) => "minute",
            (Medium::Audio, _) => "minutes",
        }
    }
}

/// Grouping tag, display and filtering only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "primary-agreement-A", alias = "primary-agreement-a")]
    AgreementA,
    #[serde(rename = "primary-agreement-B", alias = "primary-agreement-b")]
    AgreementB,
    #[serde(rename = "free-choice")]
    FreeChoice,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::AgreementA,
        Category::AgreementB,
        Category::FreeChoice,
    ];
}

/// Unknown tags read as no category rather than failing the whole book.
fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match Category::deserialize(&v) {
        Ok(category) => Some(category),
        Err(_) => {
            log::warn!("ignoring unknown category {v}");
            None
        }
    }))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Planned, Status::InProgress, Status::Completed];
}

/// One logging action. Several entries may share a date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub medium: Medium,
    pub target: u32,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<Category>,
    #[serde(default)]
    pub cover_reference: Option<String>,
    /// Newest first.
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub completed_flag: bool,
}

impl Book {
    pub fn new(id: BookId, details: BookDetails) -> Self {
        Self {
            id,
            name: details.name,
            author: details.author,
            medium: details.medium,
            target: details.target,
            category: details.category,
            cover_reference: details.cover_reference,
            logs: Vec::new(),
            status: Status::Planned,
            completed_flag: false,
        }
    }

    /// Append a log and keep the newest-first ordering. Entries on the same
    /// date keep their insertion order relative to each other.
    pub fn push_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        self.sort_logs();
    }

    pub fn sort_logs(&mut self) {
        self.logs.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn unit(&self, amount: u32) -> &'static str {
        self.medium.unit(amount)
    }

    /// Overwrite the editable fields. Logs are left alone even if the medium
    /// changes; totals are never converted between pages and minutes.
    pub fn apply_details(&mut self, details: BookDetails) {
        self.name = details.name;
        self.author = details.author;
        self.medium = details.medium;
        self.target = details.target;
        self.category = details.category;
        self.cover_reference = details.cover_reference;
    }

    pub fn details(&self) -> BookDetails {
        BookDetails {
            name: self.name.clone(),
            author: self.author.clone(),
            medium: self.medium,
            target: self.target,
            category: self.category,
            cover_reference: self.cover_reference.clone(),
        }
    }
}

/// The user-supplied fields of a book, used for both creation and editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookDetails {
    pub name: String,
    pub author: String,
    pub medium: Medium,
    pub target: u32,
    pub category: Option<Category>,
    pub cover_reference: Option<String>,
}

impl BookDetails {
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        medium: Medium,
        target: u32,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            medium,
            target,
            category: None,
            cover_reference: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover_reference = Some(cover.into());
        self
    }

    /// Trim text fields and reject anything unusable. A blank cover counts as
    /// no cover.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_string();
        self.author = self.author.trim().to_string();
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if self.target == 0 {
            return Err(ValidationError::ZeroTarget);
        }
        self.cover_reference = self
            .cover_reference
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(self)
    }
}
