use log::debug;
use std::collections::HashMap;

use crate::export::{DeviceExporter, WallpaperTarget};
use crate::gallery::GalleryStore;
use crate::model::WallpaperImage;

/// Per-item progress of a one-shot action (save to library, set wallpaper).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionStatus {
    #[default]
    Idle,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Message the preview screen shows in its dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    fn success(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            kind: NoticeKind::Success,
        }
    }

    fn error(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            kind: NoticeKind::Error,
        }
    }
}

/// `ActionStatus` per record id. Absent ids are `Idle`.
#[derive(Debug, Default)]
struct StatusBoard {
    statuses: HashMap<String, ActionStatus>,
}

impl StatusBoard {
    fn get(&self, id: &str) -> ActionStatus {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    /// Idle -> InProgress. Anything else refuses the new attempt.
    fn begin(&mut self, id: &str) -> bool {
        if self.get(id) != ActionStatus::Idle {
            return false;
        }
        self.statuses.insert(id.to_string(), ActionStatus::InProgress);
        true
    }

    /// InProgress -> Done on success, back to Idle on failure.
    fn finish(&mut self, id: &str, success: bool) {
        if success {
            self.statuses.insert(id.to_string(), ActionStatus::Done);
        } else {
            self.statuses.remove(id);
        }
    }
}

/// State behind the swipeable full-screen preview.
#[derive(Debug, Default)]
pub struct PreviewSession {
    images: Vec<WallpaperImage>,
    current: usize,
    expanded: bool,
    saving: StatusBoard,
    setting: StatusBoard,
}

impl PreviewSession {
    /// Preview the persisted gallery starting at `id` (first item when `id`
    /// is unknown).
    pub fn open_stored(store: &GalleryStore, id: &str) -> Self {
        let images = store.load();
        let current = images.iter().position(|image| image.id == id).unwrap_or(0);
        debug!("Preview opened at {} of {} for {}", current, images.len(), id);
        Self {
            images,
            current,
            ..Self::default()
        }
    }

    /// Preview a single image that is not part of the gallery.
    pub fn open_ephemeral(url: &str, prompt: &str) -> Self {
        Self {
            images: vec![WallpaperImage::ephemeral(url, prompt)],
            ..Self::default()
        }
    }

    pub fn images(&self) -> &[WallpaperImage] {
        &self.images
    }

    /// Nothing to show ("image not found").
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&WallpaperImage> {
        self.images.get(self.current)
    }

    /// Swipe to `index` (clamped). Collapses the prompt panel.
    pub fn select(&mut self, index: usize) {
        self.current = index.min(self.images.len().saturating_sub(1));
        self.expanded = false;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn save_status(&self, id: &str) -> ActionStatus {
        self.saving.get(id)
    }

    pub fn wallpaper_status(&self, id: &str) -> ActionStatus {
        self.setting.get(id)
    }

    /// Start saving the current image. Returns the image to hand to the
    /// exporter, or `None` when the action is not allowed right now.
    pub fn begin_save(&mut self) -> Option<WallpaperImage> {
        let image = self.current()?.clone();
        if image.url.is_empty() || !self.saving.begin(&image.id) {
            return None;
        }
        Some(image)
    }

    pub fn finish_save(&mut self, id: &str, success: bool) -> Option<Notice> {
        self.saving.finish(id, success);
        if success {
            None
        } else {
            Some(Notice::error(
                "Save Failed",
                "There was an issue saving the image to your gallery. Please check your permissions and try again.",
            ))
        }
    }

    pub fn begin_set_wallpaper(&mut self) -> Option<WallpaperImage> {
        let image = self.current()?.clone();
        if image.url.is_empty() || !self.setting.begin(&image.id) {
            return None;
        }
        Some(image)
    }

    pub fn finish_set_wallpaper(&mut self, id: &str, success: bool) -> Notice {
        self.setting.finish(id, success);
        if success {
            Notice::success(
                "Wallpaper Applied",
                "Your new AI wallpaper has been successfully set to your device!",
            )
        } else {
            Notice::error(
                "Application Error",
                "Failed to set the wallpaper. Your device may restrict this action.",
            )
        }
    }

    /// Save the current image to the photo library.
    pub fn save_current(&mut self, exporter: &DeviceExporter) -> Option<Notice> {
        let image = self.begin_save()?;
        let success = exporter.save_to_device_gallery(&image.url);
        self.finish_save(&image.id, success)
    }

    /// Apply the current image as wallpaper.
    pub fn set_current_wallpaper(
        &mut self,
        exporter: &DeviceExporter,
        target: WallpaperTarget,
    ) -> Option<Notice> {
        let image = self.begin_set_wallpaper()?;
        let mut success = false;
        exporter.set_as_wallpaper(&image.url, target, |res| success = res.is_success());
        Some(self.finish_set_wallpaper(&image.id, success))
    }
}
