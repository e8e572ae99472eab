// Service traits for dependency injection.
// Every component talks to the outside world through one of these, so desktop
// defaults can be swapped for platform bridges (or fakes in tests).
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::export::{PermissionStatus, PicturesLibrary, WallpaperTarget};
use crate::http::AttoHttpService;
use crate::storage::{Config, FileKeyValueStore, Settings};
use crate::wallpaper::DesktopWallpaper;

/// Blocking HTTP transport used by the generation client and the export fallback.
pub trait HttpService: Send + Sync {
    /// POST `body` as JSON with bearer auth and return the decoded JSON response.
    /// Non-2xx responses are errors.
    fn post_json(&self, url: &str, bearer_token: &str, body: &Value) -> Result<Value>;

    /// Download `url` into `dest`, returning the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// String key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// OS photo library.
pub trait PhotoLibraryService: Send + Sync {
    /// Ask for write-only access to the library.
    fn request_write_permission(&self) -> Result<PermissionStatus>;

    /// Register a local image file as a new asset and return where it landed.
    fn create_asset(&self, file: &Path) -> Result<PathBuf>;
}

/// Platform wallpaper capability.
pub trait WallpaperService: Send + Sync {
    fn set_wallpaper_from_path(&self, file_path: &Path, target: WallpaperTarget) -> Result<()>;
}

/// Bundle of the services a [`crate::Chroma`] instance is wired with.
#[derive(Clone)]
pub struct Services {
    pub http: Arc<dyn HttpService>,
    pub kv: Arc<dyn KeyValueStore>,
    pub library: Arc<dyn PhotoLibraryService>,
    pub wallpaper: Arc<dyn WallpaperService>,
}

impl Services {
    /// Default desktop wiring: attohttpc, JSON files in the config dir,
    /// the user's Pictures folder and the `wallpaper` crate.
    pub fn desktop(config: &Config, settings: &Settings) -> Self {
        Self {
            http: Arc::new(AttoHttpService::new(settings.request_timeout())),
            kv: Arc::new(FileKeyValueStore::new(config.config_dir.clone())),
            library: Arc::new(PicturesLibrary::new()),
            wallpaper: Arc::new(DesktopWallpaper),
        }
    }
}
