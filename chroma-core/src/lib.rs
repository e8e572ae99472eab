// Core library for Chroma: AI wallpaper generation, local gallery and device export.
// The cli (and any other front-end) should only talk to the items re-exported here.

pub mod app;
pub mod client;
pub mod controller;
pub mod export;
pub mod gallery;
pub mod http;
pub mod model;
pub mod preview;
pub mod prompts;
pub mod services;
pub mod storage;
pub mod wallpaper;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::Chroma;
pub use client::GenerationClient;
pub use controller::{masonry_columns, tile_height, GalleryController, GenerateOutcome};
pub use export::{
    DeviceExporter, PermissionStatus, PicturesLibrary, WallpaperResponse, WallpaperStatus,
    WallpaperTarget,
};
pub use gallery::{GalleryStore, GALLERY_KEY};
pub use http::AttoHttpService;
pub use model::{file_url, local_path, WallpaperImage, GALLERY_LIMIT, TEMP_IMAGE_ID};
pub use preview::{ActionStatus, Notice, NoticeKind, PreviewSession};
pub use services::{HttpService, KeyValueStore, PhotoLibraryService, Services, WallpaperService};
pub use storage::{sanitize_filename, Config, FileKeyValueStore, Settings};
pub use wallpaper::{get_desktop_environment, DesktopWallpaper};
