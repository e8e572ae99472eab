use anyhow::{Context, Result};
use log::{debug, error};
use std::sync::{Arc, Mutex};

use crate::model::{WallpaperImage, GALLERY_LIMIT};
use crate::services::KeyValueStore;

/// Well-known key holding the whole gallery as one JSON array.
pub const GALLERY_KEY: &str = "@wallpaper_gallery";

/// Persistent, newest-first list of wallpaper records.
///
/// `load`, `save` and `clear` never fail: errors are logged and the gallery
/// degrades to empty / unchanged. Mutations that depend on the current
/// contents go through [`GalleryStore::update`], which serializes
/// load-mutate-save inside this process.
pub struct GalleryStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl GalleryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, GALLERY_KEY)
    }

    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            kv,
            key: key.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Vec<WallpaperImage> {
        match self.try_load() {
            Ok(images) => images,
            Err(e) => {
                error!("Error loading gallery: {:#}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, images: &[WallpaperImage]) {
        let _guard = self.lock();
        self.save_unlocked(images);
    }

    /// Drop the stored key entirely.
    pub fn clear(&self) {
        let _guard = self.lock();
        match self.kv.remove(&self.key) {
            Ok(()) => debug!("Cleared gallery key {}", self.key),
            Err(e) => error!("Error clearing gallery: {:#}", e),
        }
    }

    /// Load a fresh copy, let `mutate` change it and persist the result when
    /// `mutate` reports a change. Returns the list as it stands afterwards,
    /// or `None` when the stored list could not be read; nothing is written
    /// in that case.
    pub fn update<F>(&self, mutate: F) -> Option<Vec<WallpaperImage>>
    where
        F: FnOnce(&mut Vec<WallpaperImage>) -> bool,
    {
        let _guard = self.lock();
        let mut images = match self.try_load() {
            Ok(images) => images,
            Err(e) => {
                error!("Gallery left unchanged, cannot read it: {:#}", e);
                return None;
            }
        };
        if mutate(&mut images) {
            self.save_unlocked(&images);
        }
        Some(images)
    }

    /// Insert at the front and cap the list at [`GALLERY_LIMIT`].
    pub fn prepend(&self, image: WallpaperImage) -> Option<Vec<WallpaperImage>> {
        self.update(|images| {
            images.insert(0, image);
            images.truncate(GALLERY_LIMIT);
            true
        })
    }

    /// Remove every record with `id`. Returns the remaining list and whether
    /// anything was removed; unknown ids leave the store untouched.
    pub fn remove(&self, id: &str) -> Option<(Vec<WallpaperImage>, bool)> {
        let mut removed = false;
        let images = self.update(|images| {
            let before = images.len();
            images.retain(|image| image.id != id);
            removed = images.len() != before;
            removed
        })?;
        Some((images, removed))
    }

    fn try_load(&self) -> Result<Vec<WallpaperImage>> {
        match self.kv.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).context("Stored gallery is not a valid record list")
            }
            _ => Ok(Vec::new()),
        }
    }

    fn save_unlocked(&self, images: &[WallpaperImage]) {
        let result = serde_json::to_string(images)
            .context("Failed to serialize gallery")
            .and_then(|raw| self.kv.set(&self.key, &raw));
        match result {
            Ok(()) => debug!("Saved {} gallery records", images.len()),
            Err(e) => error!("Error saving gallery: {:#}", e),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
