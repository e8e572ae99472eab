// Entry point for front-ends: wires config, settings and services into the
// components and exposes the presentation-layer contract.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::client::GenerationClient;
use crate::controller::GalleryController;
use crate::export::{DeviceExporter, WallpaperResponse, WallpaperTarget};
use crate::gallery::GalleryStore;
use crate::model::WallpaperImage;
use crate::preview::PreviewSession;
use crate::services::Services;
use crate::storage::{Config, Settings};

pub struct Chroma {
    config: Config,
    store: Arc<GalleryStore>,
    client: Arc<GenerationClient>,
    exporter: DeviceExporter,
}

impl Chroma {
    /// Platform directories, `settings.json` + environment, desktop services.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::new()?)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let settings = Settings::load(&config)?;
        let services = Services::desktop(&config, &settings);
        Ok(Self::with_services(config, settings, services))
    }

    pub fn with_services(config: Config, settings: Settings, services: Services) -> Self {
        info!("Gallery data in {:?}, images in {:?}", config.config_dir, config.documents_dir);
        let store = Arc::new(GalleryStore::new(services.kv));
        let client = Arc::new(GenerationClient::new(
            services.http.clone(),
            settings,
            config.documents_dir.clone(),
        ));
        let exporter = DeviceExporter::new(
            services.http,
            services.library,
            services.wallpaper,
            config.documents_dir.clone(),
        );

        Self {
            config,
            store,
            client,
            exporter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn exporter(&self) -> &DeviceExporter {
        &self.exporter
    }

    pub fn load_gallery(&self) -> Vec<WallpaperImage> {
        self.store.load()
    }

    pub fn save_gallery(&self, images: &[WallpaperImage]) {
        self.store.save(images)
    }

    pub fn generate_image(&self, prompt: &str) -> Option<WallpaperImage> {
        self.client.generate_image(prompt)
    }

    pub fn generate_prompt_idea(&self) -> Option<String> {
        self.client.generate_prompt_idea()
    }

    pub fn save_to_device_gallery(&self, image_url: &str) -> bool {
        self.exporter.save_to_device_gallery(image_url)
    }

    pub fn set_as_wallpaper<F>(&self, image_url: &str, target: WallpaperTarget, callback: F)
    where
        F: FnOnce(WallpaperResponse),
    {
        self.exporter.set_as_wallpaper(image_url, target, callback)
    }

    /// A gallery view backed by this instance's store and client.
    pub fn controller(&self) -> GalleryController {
        GalleryController::new(
            Arc::clone(&self.store),
            Arc::clone(&self.client),
            self.config.documents_dir.clone(),
        )
    }

    pub fn open_preview(&self, id: &str) -> PreviewSession {
        PreviewSession::open_stored(&self.store, id)
    }
}
