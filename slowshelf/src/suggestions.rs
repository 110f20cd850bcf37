//! Name and author autocompletion drawn from the shelf itself

use crate::book::Book;
use serde::{Deserialize, Serialize};

/// Entries the user dismissed from the suggestion lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenSuggestions {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl HiddenSuggestions {
    /// Returns false if the name was already hidden.
    pub fn hide_name(&mut self, name: &str) -> bool {
        hide(&mut self.names, name)
    }

    pub fn hide_author(&mut self, author: &str) -> bool {
        hide(&mut self.authors, author)
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.authors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.authors.is_empty()
    }
}

fn hide(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        return false;
    }
    list.push(value.to_string());
    true
}

pub fn name_suggestions(books: &[Book], hidden: &HiddenSuggestions, prefix: &str) -> Vec<String> {
    suggest(books.iter().map(|b| b.name.as_str()), &hidden.names, prefix)
}

pub fn author_suggestions(books: &[Book], hidden: &HiddenSuggestions, prefix: &str) -> Vec<String> {
    suggest(books.iter().map(|b| b.author.as_str()), &hidden.authors, prefix)
}

/// Distinct values starting with `prefix` (case-insensitive), sorted, minus
/// hidden ones.
fn suggest<'a>(
    values: impl Iterator<Item = &'a str>,
    hidden: &[String],
    prefix: &str,
) -> Vec<String> {
    let prefix = prefix.trim().to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.to_lowercase().starts_with(&prefix) {
            continue;
        }
        if hidden.iter().any(|h| h.eq_ignore_ascii_case(value)) {
            continue;
        }
        if out.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            continue;
        }
        out.push(value.to_string());
    }
    out.sort_by_key(|v| v.to_lowercase());
    out
}
