use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::services::HttpService;

const USER_AGENT: &str = concat!("Chroma/", env!("CARGO_PKG_VERSION"));

/// Blocking transport backed by attohttpc.
#[derive(Debug, Clone, Default)]
pub struct AttoHttpService {
    timeout: Option<Duration>,
}

impl AttoHttpService {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl HttpService for AttoHttpService {
    fn post_json(&self, url: &str, bearer_token: &str, body: &Value) -> Result<Value> {
        let mut request = attohttpc::post(url)
            .bearer_auth(bearer_token)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .json(body)?
            .send()
            .with_context(|| format!("POST {} failed", url))?;
        let status = response.status();
        let text = response.text()?;
        debug!("POST {} -> {} ({} bytes)", url, status, text.len());

        if !status.is_success() {
            bail!("POST {} returned {}: {}", url, status, snippet(&text));
        }
        serde_json::from_str(&text)
            .with_context(|| format!("POST {} returned invalid JSON: {}", url, snippet(&text)))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut request = attohttpc::get(url).header("User-Agent", USER_AGENT);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {}", url, status);
        }

        let bytes = response.bytes()?;
        fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;
        debug!("Downloaded {} bytes from {} to {:?}", bytes.len(), url, dest);
        Ok(bytes.len() as u64)
    }
}

/// Download `url` to `dest`; on failure any partially written `dest` is removed.
pub(crate) fn download_or_discard(http: &dyn HttpService, url: &str, dest: &Path) -> Result<u64> {
    http.download(url, dest).map_err(|e| {
        if dest.exists() {
            if let Err(rm) = fs::remove_file(dest) {
                warn!("Failed to remove partial download {:?}: {}", dest, rm);
            }
        }
        e.context(format!("Failed to download {}", url))
    })
}

fn snippet(text: &str) -> String {
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}
