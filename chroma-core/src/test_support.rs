// In-process fakes for the service traits.
use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::export::{PermissionStatus, WallpaperTarget};
use crate::model::WallpaperImage;
use crate::services::{HttpService, PhotoLibraryService, Services, WallpaperService};
use crate::storage::{Config, FileKeyValueStore};

pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFFfake-jpeg";

#[derive(Default)]
pub struct FakeHttp {
    responses: Mutex<VecDeque<Result<Value, String>>>,
    pub posts: Mutex<Vec<(String, String, Value)>>,
    pub downloads: Mutex<Vec<(String, PathBuf)>>,
    pub fail_downloads: bool,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_downloads() -> Self {
        Self {
            fail_downloads: true,
            ..Self::default()
        }
    }

    pub fn respond(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn last_body(&self) -> Value {
        self.posts.lock().unwrap().last().unwrap().2.clone()
    }
}

impl HttpService for FakeHttp {
    fn post_json(&self, url: &str, bearer_token: &str, body: &Value) -> Result<Value> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), bearer_token.to_string(), body.clone()));
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => bail!("no canned response for {}", url),
        }
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));
        if self.fail_downloads {
            // leave a partial file behind like an interrupted transfer would
            fs::write(dest, b"\xFF")?;
            bail!("connection reset while downloading {}", url);
        }
        fs::write(dest, IMAGE_BYTES)?;
        Ok(IMAGE_BYTES.len() as u64)
    }
}

pub struct FakeLibrary {
    pub permission: PermissionStatus,
    pub fail_create: bool,
    pub assets: Mutex<Vec<PathBuf>>,
}

impl FakeLibrary {
    pub fn granted() -> Self {
        Self {
            permission: PermissionStatus::Granted,
            fail_create: false,
            assets: Mutex::new(Vec::new()),
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            ..Self::granted()
        }
    }

    pub fn broken() -> Self {
        Self {
            fail_create: true,
            ..Self::granted()
        }
    }

    pub fn asset_count(&self) -> usize {
        self.assets.lock().unwrap().len()
    }
}

impl PhotoLibraryService for FakeLibrary {
    fn request_write_permission(&self) -> Result<PermissionStatus> {
        Ok(self.permission)
    }

    fn create_asset(&self, file: &Path) -> Result<PathBuf> {
        if self.fail_create || !file.exists() {
            bail!("cannot create asset from {}", file.display());
        }
        self.assets.lock().unwrap().push(file.to_path_buf());
        Ok(file.to_path_buf())
    }
}

#[derive(Default)]
pub struct FakeWallpaper {
    pub fail: bool,
    pub calls: Mutex<Vec<(PathBuf, WallpaperTarget)>>,
}

impl FakeWallpaper {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl WallpaperService for FakeWallpaper {
    fn set_wallpaper_from_path(&self, file_path: &Path, target: WallpaperTarget) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((file_path.to_path_buf(), target));
        if self.fail {
            bail!("device refused wallpaper change");
        }
        Ok(())
    }
}

pub struct Fakes {
    pub http: Arc<FakeHttp>,
    pub library: Arc<FakeLibrary>,
    pub wallpaper: Arc<FakeWallpaper>,
}

impl Fakes {
    pub fn new() -> Self {
        Self::with(FakeHttp::new(), FakeLibrary::granted(), FakeWallpaper::default())
    }

    pub fn with(http: FakeHttp, library: FakeLibrary, wallpaper: FakeWallpaper) -> Self {
        Self {
            http: Arc::new(http),
            library: Arc::new(library),
            wallpaper: Arc::new(wallpaper),
        }
    }

    pub fn services(&self, config: &Config) -> Services {
        Services {
            http: self.http.clone(),
            kv: Arc::new(FileKeyValueStore::new(config.config_dir.clone())),
            library: self.library.clone(),
            wallpaper: self.wallpaper.clone(),
        }
    }
}

pub fn image(id: &str) -> WallpaperImage {
    WallpaperImage {
        id: id.to_string(),
        url: format!("file:///tmp/wallpaper_{}.jpg", id),
        prompt: format!("prompt {}", id),
        timestamp: "2025-01-01T00:00:00.000Z".to_string(),
    }
}

pub fn images(ids: &[&str]) -> Vec<WallpaperImage> {
    ids.iter().map(|id| image(id)).collect()
}

pub fn ids(list: &[WallpaperImage]) -> Vec<&str> {
    list.iter().map(|image| image.id.as_str()).collect()
}

pub fn generation_response(url: &str) -> Value {
    serde_json::json!({ "created": 1, "data": [{ "url": url }] })
}

pub fn completion_response(content: &str) -> Value {
    serde_json::json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}
