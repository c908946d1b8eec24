//! Media library items, upload merging and path normalization.
//!
//! The media library is owned by the platform; the admin picker lists it,
//! uploads batches into it and hands the selected item back to a form field as
//! a tenant-relative storage path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::MediaId;

/// Path prefix under which the platform serves uploaded files.
pub const STORAGE_PREFIX: &str = "/storage/";

/// An uploaded asset in a tenant's media library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    pub name: String,
    pub file_name: String,
    pub url: String,
    #[serde(default)]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// URL to show in the picker grid.
    #[must_use]
    pub fn preview_url(&self) -> &str {
        self.thumb_url.as_deref().unwrap_or(&self.url)
    }

    /// Storage path to write into a form field when this item is picked.
    #[must_use]
    pub fn storage_path(&self) -> String {
        storage_path(&self.url)
    }

    /// File size for display (`512 B`, `12.4 KB`, `3.1 MB`).
    #[must_use]
    pub fn human_size(&self) -> String {
        const KIB: u64 = 1024;
        const MIB: u64 = KIB * 1024;

        let (unit, label) = match self.size {
            size if size >= MIB => (MIB, "MB"),
            size if size >= KIB => (KIB, "KB"),
            size => return format!("{size} B"),
        };
        let tenths = self.size * 10 / unit;
        format!("{}.{} {label}", tenths / 10, tenths % 10)
    }
}

/// Normalize a picked URL to a tenant-relative storage path.
///
/// Surrounding whitespace is always trimmed.
///
/// - A value already rooted at `/storage/` is returned unchanged.
/// - An absolute URL whose path contains `/storage/` is cut down to the path
///   from that segment onward (query and fragment are dropped).
/// - Anything else, including foreign URLs, is passed through as is.
#[must_use]
pub fn storage_path(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with(STORAGE_PREFIX) {
        return trimmed.to_string();
    }

    if let Ok(parsed) = Url::parse(trimmed) {
        let path = parsed.path();
        if let Some(relative) = path
            .find(STORAGE_PREFIX)
            .and_then(|index| path.get(index..))
        {
            return relative.to_string();
        }
    }

    trimmed.to_string()
}

/// Platform response to a batch upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadBatch {
    /// Items that were stored.
    #[serde(default)]
    pub data: Vec<MediaItem>,
    /// One message per file that failed.
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadBatch {
    /// Whether some, but not all, files were rejected.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.data.is_empty() && !self.errors.is_empty()
    }

    /// Merge the uploaded items into `library`, newest first.
    ///
    /// Items already present (same ID) are replaced instead of duplicated.
    /// Returns how many new items were added.
    pub fn merge_into(&self, library: &mut Vec<MediaItem>) -> usize {
        let before = library.len();
        library.retain(|existing| !self.data.iter().any(|new| new.id == existing.id));
        let replaced = before - library.len();

        let mut merged = self.data.clone();
        merged.append(library);
        *library = merged;

        self.data.len().saturating_sub(replaced)
    }
}

/// Whether the picker returns one path or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Single,
    Multiple,
}

/// Paths picked in the media picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSelection {
    pub mode: SelectionMode,
    paths: Vec<String>,
}

impl MediaSelection {
    #[must_use]
    pub const fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            paths: Vec::new(),
        }
    }

    /// Toggle `url` in the selection. Returns whether it is now selected.
    ///
    /// In single mode picking a new item replaces the previous one.
    pub fn toggle(&mut self, url: &str) -> bool {
        let path = storage_path(url);
        if let Some(index) = self.paths.iter().position(|p| *p == path) {
            self.paths.remove(index);
            return false;
        }
        if self.mode == SelectionMode::Single {
            self.paths.clear();
        }
        self.paths.push(path);
        true
    }

    #[must_use]
    pub fn is_selected(&self, url: &str) -> bool {
        let path = storage_path(url);
        self.paths.contains(&path)
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The single picked path, for single-select fields.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}
