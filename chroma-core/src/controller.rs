use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::GenerationClient;
use crate::gallery::GalleryStore;
use crate::model::{WallpaperImage, FILE_PREFIX};

/// Result of a generate request from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Created(WallpaperImage),
    EmptyPrompt,
    Failed,
}

/// Sits between the gallery store and whatever renders the gallery.
///
/// The copy held here is only for display; every mutation goes through the
/// store and the copy is replaced by what the store reports afterwards.
pub struct GalleryController {
    store: Arc<GalleryStore>,
    client: Arc<GenerationClient>,
    documents_dir: PathBuf,
    images: Vec<WallpaperImage>,
}

impl GalleryController {
    pub fn new(store: Arc<GalleryStore>, client: Arc<GenerationClient>, documents_dir: PathBuf) -> Self {
        Self {
            store,
            client,
            documents_dir,
            images: Vec::new(),
        }
    }

    /// Refresh-on-focus: replace the visible list with the persisted one.
    pub fn activate(&mut self) -> &[WallpaperImage] {
        self.images = self.store.load();
        &self.images
    }

    pub fn images(&self) -> &[WallpaperImage] {
        &self.images
    }

    pub fn item_count(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&WallpaperImage> {
        self.images.iter().find(|image| image.id == id)
    }

    /// Remove the record with `id`. The visible list changes only after the
    /// store has been written. Returns whether the store held such a record.
    pub fn delete_image(&mut self, id: &str) -> bool {
        let Some((images, removed)) = self.store.remove(id) else {
            return false;
        };
        self.images = images;
        if removed {
            info!("Deleted wallpaper {}", id);
        }
        removed
    }

    /// Generate an image for `prompt` and put it at the front of the gallery.
    /// The prompt is sent and recorded exactly as given.
    pub fn generate(&mut self, prompt: &str) -> GenerateOutcome {
        if prompt.trim().is_empty() {
            return GenerateOutcome::EmptyPrompt;
        }

        let Some(image) = self.client.generate_image(prompt) else {
            return GenerateOutcome::Failed;
        };
        match self.store.prepend(image.clone()) {
            Some(images) => {
                self.images = images;
                GenerateOutcome::Created(image)
            }
            None => {
                warn!("Generated {} but the gallery could not be updated", image.url);
                GenerateOutcome::Failed
            }
        }
    }

    pub fn surprise_me(&self) -> Option<String> {
        self.client.generate_prompt_idea()
    }

    /// Forget every record and delete every `wallpaper_*` file in the
    /// documents directory. Returns the number of files deleted.
    pub fn clear_cache(&mut self) -> usize {
        self.store.clear();
        self.images.clear();

        let entries = match fs::read_dir(&self.documents_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {:?}: {}", self.documents_dir, e);
                return 0;
            }
        };

        let mut deleted = 0;
        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            let is_ours = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(FILE_PREFIX))
                .unwrap_or(false);
            if !is_ours || !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Failed to delete {:?}: {}", path, e),
            }
        }
        info!("Cache cleared, {} image files deleted", deleted);
        deleted
    }
}

/// Tile height for the two-column masonry: 200, 260 or 320 picked by the
/// code of the id's last character.
pub fn tile_height(id: &str) -> u32 {
    let code = id.chars().last().map(|c| c as u32).unwrap_or(0);
    200 + (code % 3) * 60
}

/// Even indices go left, odd indices go right.
pub fn masonry_columns(images: &[WallpaperImage]) -> (Vec<&WallpaperImage>, Vec<&WallpaperImage>) {
    let mut left = Vec::with_capacity(images.len() / 2 + 1);
    let mut right = Vec::with_capacity(images.len() / 2);
    for (i, image) in images.iter().enumerate() {
        if i % 2 == 0 {
            left.push(image);
        } else {
            right.push(image);
        }
    }
    (left, right)
}
