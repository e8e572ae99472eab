use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of records kept in the persisted gallery.
pub const GALLERY_LIMIT: usize = 50;

/// Id used for a preview record that has not been persisted.
pub const TEMP_IMAGE_ID: &str = "temp";

/// Prefix shared by every image file the app writes to its documents dir.
pub const FILE_PREFIX: &str = "wallpaper_";

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallpaperImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    pub timestamp: String,
}

impl WallpaperImage {
    /// Ephemeral record for previewing an image that is not in the gallery.
    pub fn ephemeral(url: &str, prompt: &str) -> Self {
        Self {
            id: TEMP_IMAGE_ID.to_string(),
            url: url.to_string(),
            prompt: prompt.to_string(),
            timestamp: iso_timestamp(Utc::now()),
        }
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2025-01-31T08:15:02.120Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn file_url(path: &Path) -> String {
    format!("{}{}", FILE_SCHEME, path.display())
}

/// Path behind a `file://` url, `None` for anything else.
pub fn local_path(url: &str) -> Option<PathBuf> {
    url.strip_prefix(FILE_SCHEME)
        .filter(|rest| !rest.is_empty())
        .map(PathBuf::from)
}

/// `wallpaper_<millis>.jpg`, or `wallpaper_<tag>_<millis>.jpg` when a tag is given.
pub fn image_file_name(tag: Option<&str>, millis: i64) -> String {
    match tag {
        Some(tag) => format!("{}{}_{}.jpg", FILE_PREFIX, tag, millis),
        None => format!("{}{}.jpg", FILE_PREFIX, millis),
    }
}
