use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::services::KeyValueStore;

pub const IMAGE_API_KEY_ENV: &str = "CHROMA_IMAGE_API_KEY";
pub const CHAT_API_KEY_ENV: &str = "CHROMA_CHAT_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub documents_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "chroma", "chroma")
            .context("Failed to get project directories")?;

        Self::from_dirs(
            proj_dirs.config_dir().to_path_buf(),
            proj_dirs.data_dir().join("documents"),
        )
    }

    /// Same layout rooted at an arbitrary directory.
    pub fn with_root(root: &Path) -> Result<Self> {
        Self::from_dirs(root.join("config"), root.join("documents"))
    }

    fn from_dirs(config_dir: PathBuf, documents_dir: PathBuf) -> Result<Self> {
        let settings_file = config_dir.join("settings.json");

        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        fs::create_dir_all(&documents_dir)
            .with_context(|| format!("Failed to create {}", documents_dir.display()))?;
        debug!("Config dirs: config={:?} documents={:?}", config_dir, documents_dir);

        Ok(Config {
            config_dir,
            documents_dir,
            settings_file,
        })
    }
}

/// Endpoints, models and tokens for the two remote APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub image_endpoint: String,
    pub image_model: String,
    pub image_api_key: Option<String>,
    pub chat_endpoint: String,
    pub chat_model: String,
    pub chat_api_key: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_endpoint: "https://api.a4f.co/v1/images/generations".to_string(),
            image_model: "provider-4/imagen-4".to_string(),
            image_api_key: None,
            chat_endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            chat_model: "openai/gpt-oss-120b".to_string(),
            chat_api_key: None,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// `settings.json` if present (defaults otherwise), then environment overrides.
    pub fn load(config: &Config) -> Result<Self> {
        let settings = if config.settings_file.exists() {
            let content = fs::read_to_string(&config.settings_file)?;
            serde_json::from_str(&content).with_context(|| {
                format!("Failed to parse {}", config.settings_file.display())
            })?
        } else {
            info!("No settings file at {:?}, using defaults", config.settings_file);
            Settings::default()
        };

        Ok(settings.with_overrides(|name| std::env::var(name).ok()))
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(IMAGE_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.image_api_key = Some(key.trim().to_string());
        }
        if let Some(key) = lookup(CHAT_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.chat_api_key = Some(key.trim().to_string());
        }
        self
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config.settings_file, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// One JSON file per key under a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_filename(key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.key_path(key);
        // Readers only ever see the old or the new value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    let sanitized = filename
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>();

    // Keep it reasonable for every filesystem
    if sanitized.len() > 100 {
        sanitized.chars().take(100).collect()
    } else {
        sanitized
    }
}
