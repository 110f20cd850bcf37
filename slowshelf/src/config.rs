//! Where the shelf keeps its data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slowcore::storage::{config_dir, documents_dir};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "slowshelf";

/// Overrides `data_dir` when set.
pub const DATA_DIR_ENV: &str = "SLOWSHELF_DATA_DIR";

/// Keys are camelCase like every other file the shelf writes. The snake_case
/// spellings are still read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfConfig {
    /// Directory holding one JSON file per persisted slice.
    #[serde(default = "default_data_dir", alias = "data_dir")]
    pub data_dir: PathBuf,
    /// Where exported backups go unless the user picks another place.
    #[serde(default = "documents_dir", alias = "backup_dir")]
    pub backup_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    config_dir(APP_NAME)
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backup_dir: documents_dir(),
        }
    }
}

impl ShelfConfig {
    pub fn config_path() -> PathBuf {
        config_dir(APP_NAME).join("config.json")
    }

    /// Config file if present, then the environment override.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path());
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    /// A missing or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Suggested file name for a backup taken on `date`.
    pub fn backup_path(&self, date: NaiveDate) -> PathBuf {
        self.backup_dir.join(format!("slowshelf-{}.json", date.format("%Y-%m-%d")))
    }
}
