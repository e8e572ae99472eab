use anyhow::{bail, Context, Result};
use chrono::Utc;
use directories::UserDirs;
use log::{error, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::http::download_or_discard;
use crate::model::{image_file_name, local_path};
use crate::services::{HttpService, PhotoLibraryService, WallpaperService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Which screen(s) a wallpaper is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperTarget {
    Home,
    Lock,
    Both,
}

impl fmt::Display for WallpaperTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WallpaperTarget::Home => "home",
            WallpaperTarget::Lock => "lock",
            WallpaperTarget::Both => "both",
        };
        f.write_str(name)
    }
}

impl FromStr for WallpaperTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(WallpaperTarget::Home),
            "lock" => Ok(WallpaperTarget::Lock),
            "both" => Ok(WallpaperTarget::Both),
            other => bail!("unknown wallpaper target '{}' (expected home, lock or both)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperStatus {
    Success,
    Error,
}

/// What the wallpaper callback receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperResponse {
    pub status: WallpaperStatus,
    pub msg: String,
    pub url: String,
}

impl WallpaperResponse {
    pub fn is_success(&self) -> bool {
        self.status == WallpaperStatus::Success
    }
}

/// Photo library backed by a folder under the user's Pictures directory.
pub struct PicturesLibrary {
    album_dir: Option<PathBuf>,
}

impl PicturesLibrary {
    pub fn new() -> Self {
        let album_dir = UserDirs::new()
            .and_then(|dirs| dirs.picture_dir().map(|p| p.join("Chroma")));
        Self { album_dir }
    }

    pub fn with_dir(album_dir: PathBuf) -> Self {
        Self {
            album_dir: Some(album_dir),
        }
    }
}

impl Default for PicturesLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoLibraryService for PicturesLibrary {
    fn request_write_permission(&self) -> Result<PermissionStatus> {
        let Some(dir) = &self.album_dir else {
            return Ok(PermissionStatus::Denied);
        };
        match fs::create_dir_all(dir) {
            Ok(()) => Ok(PermissionStatus::Granted),
            Err(e) => {
                error!("Cannot write to {:?}: {}", dir, e);
                Ok(PermissionStatus::Denied)
            }
        }
    }

    fn create_asset(&self, file: &Path) -> Result<PathBuf> {
        let dir = self
            .album_dir
            .as_ref()
            .context("No pictures directory on this system")?;
        if !file.is_file() {
            bail!("{} is not a file", file.display());
        }
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .context("Image path has no file name")?;

        let mut target = dir.join(name);
        if target.exists() {
            target = dir.join(format!("{}_{}", Utc::now().timestamp_millis(), name));
        }
        fs::copy(file, &target)
            .with_context(|| format!("Failed to copy {} to {}", file.display(), target.display()))?;
        Ok(target)
    }
}

/// Pushes local images out of the app: into the photo library or onto the screen.
pub struct DeviceExporter {
    http: Arc<dyn HttpService>,
    library: Arc<dyn PhotoLibraryService>,
    wallpaper: Arc<dyn WallpaperService>,
    documents_dir: PathBuf,
}

impl DeviceExporter {
    pub fn new(
        http: Arc<dyn HttpService>,
        library: Arc<dyn PhotoLibraryService>,
        wallpaper: Arc<dyn WallpaperService>,
        documents_dir: PathBuf,
    ) -> Self {
        Self {
            http,
            library,
            wallpaper,
            documents_dir,
        }
    }

    /// Copy the image into the photo library. `false` when permission is
    /// refused (nothing else is touched) or any later step fails.
    pub fn save_to_device_gallery(&self, image_url: &str) -> bool {
        match self.library.request_write_permission() {
            Ok(PermissionStatus::Granted) => {}
            Ok(status) => {
                error!("Media library permission not granted ({:?})", status);
                return false;
            }
            Err(e) => {
                error!("Media library permission request failed: {:#}", e);
                return false;
            }
        }

        let result = self
            .ensure_local(image_url)
            .and_then(|file| self.library.create_asset(&file));
        match result {
            Ok(asset) => {
                info!("Saved {} to photo library as {:?}", image_url, asset);
                true
            }
            Err(e) => {
                error!("Error saving to gallery: {:#}", e);
                false
            }
        }
    }

    /// Apply the image as wallpaper and report the outcome through `callback`.
    pub fn set_as_wallpaper<F>(&self, image_url: &str, target: WallpaperTarget, callback: F)
    where
        F: FnOnce(WallpaperResponse),
    {
        let result = self
            .ensure_local(image_url)
            .and_then(|file| self.wallpaper.set_wallpaper_from_path(&file, target));

        let response = match result {
            Ok(()) => WallpaperResponse {
                status: WallpaperStatus::Success,
                msg: format!("Wallpaper applied to {} screen", target),
                url: image_url.to_string(),
            },
            Err(e) => {
                error!("Error setting wallpaper: {:#}", e);
                WallpaperResponse {
                    status: WallpaperStatus::Error,
                    msg: format!("{:#}", e),
                    url: image_url.to_string(),
                }
            }
        };
        callback(response);
    }

    /// Local files are used as-is; anything else is downloaded first.
    fn ensure_local(&self, image_url: &str) -> Result<PathBuf> {
        if let Some(path) = local_path(image_url) {
            return Ok(path);
        }
        if image_url.is_empty() {
            bail!("Empty image url");
        }

        fs::create_dir_all(&self.documents_dir)?;
        let file = self
            .documents_dir
            .join(image_file_name(Some("saved"), Utc::now().timestamp_millis()));
        download_or_discard(self.http.as_ref(), image_url, &file)?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::file_url;
    use crate::test_support::{Fakes, FakeHttp, FakeLibrary, FakeWallpaper, IMAGE_BYTES};
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn exporter(fakes: &Fakes, temp_dir: &TempDir) -> DeviceExporter {
        DeviceExporter::new(
            fakes.http.clone(),
            fakes.library.clone(),
            fakes.wallpaper.clone(),
            temp_dir.path().join("documents"),
        )
    }

    fn local_image(temp_dir: &TempDir) -> String {
        let path = temp_dir.path().join("wallpaper_1.jpg");
        fs::write(&path, IMAGE_BYTES).unwrap();
        file_url(&path)
    }

    #[test]
    fn test_save_local_file_registers_directly() {
        let temp_dir = TempDir::new().unwrap();
        let fakes = Fakes::new();
        let url = local_image(&temp_dir);

        assert!(exporter(&fakes, &temp_dir).save_to_device_gallery(&url));
        assert_eq!(fakes.library.asset_count(), 1);
        assert!(fakes.http.downloads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_save_remote_url_downloads_first() {
        let temp_dir = TempDir::new().unwrap();
        let fakes = Fakes::new();

        assert!(exporter(&fakes, &temp_dir).save_to_device_gallery("https://x/y.jpg"));

        let downloads = fakes.http.downloads.lock().unwrap();
        assert_eq!(downloads.len(), 1);
        let name = downloads[0].1.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("wallpaper_saved_"));
        assert_eq!(fakes.library.assets.lock().unwrap()[0], downloads[0].1);
    }

    #[test]
    fn test_save_permission_denied_has_no_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let fakes = Fakes::with(FakeHttp::new(), FakeLibrary::denied(), FakeWallpaper::default());

        assert!(!exporter(&fakes, &temp_dir).save_to_device_gallery("https://x/y.jpg"));
        assert_eq!(fakes.library.asset_count(), 0);
        assert!(fakes.http.downloads.lock().unwrap().is_empty());
        assert!(!temp_dir.path().join("documents").exists());
    }

    #[test]
    fn test_save_failures_are_false() {
        let temp_dir = TempDir::new().unwrap();
        let fakes = Fakes::with(FakeHttp::new(), FakeLibrary::broken(), FakeWallpaper::default());
        let url = local_image(&temp_dir);
        assert!(!exporter(&fakes, &temp_dir).save_to_device_gallery(&url));

        let fakes = Fakes::with(FakeHttp::failing_downloads(), FakeLibrary::granted(), FakeWallpaper::default());
        assert!(!exporter(&fakes, &temp_dir).save_to_device_gallery("https://x/y.jpg"));
        assert_eq!(fakes.library.asset_count(), 0);
        // the partial download does not linger in documents
        let leftovers = fs::read_dir(temp_dir.path().join("documents")).unwrap().count();
        assert_eq!(leftovers, 0);

        assert!(!exporter(&fakes, &temp_dir).save_to_device_gallery("file:///missing/wallpaper_9.jpg"));
    }

    #[test]
    fn test_set_wallpaper_reports_success() {
        let temp_dir = TempDir::new().unwrap();
        let fakes = Fakes::new();
        let url = local_image(&temp_dir);
        let seen = RefCell::new(None);

        exporter(&fakes, &temp_dir).set_as_wallpaper(&url, WallpaperTarget::Both, |res| {
            *seen.borrow_mut() = Some(res);
        });

        let response = seen.into_inner().unwrap();
        assert_eq!(response.status, WallpaperStatus::Success);
        assert_eq!(response.url, url);
        let calls = fakes.wallpaper.calls.lock().unwrap();
        assert_eq!(calls[0].1, WallpaperTarget::Both);
    }

    #[test]
    fn test_set_wallpaper_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let fakes = Fakes::with(FakeHttp::new(), FakeLibrary::granted(), FakeWallpaper::failing());
        let url = local_image(&temp_dir);
        let seen = RefCell::new(None);

        exporter(&fakes, &temp_dir).set_as_wallpaper(&url, WallpaperTarget::Home, |res| {
            *seen.borrow_mut() = Some(res);
        });

        let response = seen.into_inner().unwrap();
        assert_eq!(response.status, WallpaperStatus::Error);
        assert!(!response.is_success());
        assert_eq!(fakes.wallpaper.call_count(), 1);
    }

    #[test]
    fn test_target_parse_and_display() {
        assert_eq!("Lock".parse::<WallpaperTarget>().unwrap(), WallpaperTarget::Lock);
        assert_eq!(" both ".parse::<WallpaperTarget>().unwrap(), WallpaperTarget::Both);
        assert!("desk".parse::<WallpaperTarget>().is_err());
        assert_eq!(WallpaperTarget::Home.to_string(), "home");
    }

    #[test]
    fn test_pictures_library_copies_without_overwriting() {
        let temp_dir = TempDir::new().unwrap();
        let library = PicturesLibrary::with_dir(temp_dir.path().join("Pictures/Chroma"));
        let url = local_image(&temp_dir);
        let source = local_path(&url).unwrap();

        assert_eq!(library.request_write_permission().unwrap(), PermissionStatus::Granted);
        let first = library.create_asset(&source).unwrap();
        let second = library.create_asset(&source).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), IMAGE_BYTES);
        assert_eq!(fs::read(&second).unwrap(), IMAGE_BYTES);
    }

    #[test]
    fn test_pictures_library_without_dir_is_denied() {
        let library = PicturesLibrary { album_dir: None };
        assert_eq!(library.request_write_permission().unwrap(), PermissionStatus::Denied);
    }
}
