use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::download_or_discard;
use crate::model::{file_url, image_file_name, iso_timestamp, WallpaperImage};
use crate::prompts::{normalize_prompt_idea, PromptRecipe, USER_PROMPT};
use crate::services::HttpService;
use crate::storage::Settings;

/// Portrait size requested from the image endpoint.
pub const IMAGE_SIZE: &str = "1024x1792";

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Talks to the image-generation and chat-completion endpoints.
pub struct GenerationClient {
    http: Arc<dyn HttpService>,
    settings: Settings,
    documents_dir: PathBuf,
}

impl GenerationClient {
    pub fn new(http: Arc<dyn HttpService>, settings: Settings, documents_dir: PathBuf) -> Self {
        Self {
            http,
            settings,
            documents_dir,
        }
    }

    /// Generate one image for `prompt` and download it locally.
    /// `None` on any failure; nothing is retried.
    pub fn generate_image(&self, prompt: &str) -> Option<WallpaperImage> {
        match self.try_generate_image(prompt) {
            Ok(image) => {
                info!("Generated wallpaper {} at {}", image.id, image.url);
                Some(image)
            }
            Err(e) => {
                error!("Error generating image: {:#}", e);
                None
            }
        }
    }

    /// Ask the chat endpoint for a fresh wallpaper prompt.
    pub fn generate_prompt_idea(&self) -> Option<String> {
        let recipe = PromptRecipe::random(&mut rand::thread_rng());
        match self.try_generate_prompt_idea(&recipe) {
            Ok(idea) => Some(idea),
            Err(e) => {
                error!("Error generating prompt idea: {:#}", e);
                None
            }
        }
    }

    fn try_generate_image(&self, prompt: &str) -> Result<WallpaperImage> {
        let token = api_key(&self.settings.image_api_key, "image generation")?;
        let request = ImageGenerationRequest {
            model: &self.settings.image_model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
        };
        let body = serde_json::to_value(&request)?;
        let response = self
            .http
            .post_json(&self.settings.image_endpoint, token, &body)?;

        let parsed: ImageGenerationResponse = serde_json::from_value(response)
            .context("Unexpected image generation response")?;
        let remote_url = parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.is_empty())
            .context("Image generation response has no data[0].url")?;

        // Remote urls expire, so the record only ever points at the local copy.
        let created = Utc::now();
        let millis = created.timestamp_millis();
        fs::create_dir_all(&self.documents_dir)?;
        let file_path = self.documents_dir.join(image_file_name(None, millis));
        download_or_discard(self.http.as_ref(), &remote_url, &file_path)?;

        Ok(WallpaperImage {
            id: millis.to_string(),
            url: file_url(&file_path),
            prompt: prompt.to_string(),
            timestamp: iso_timestamp(created),
        })
    }

    fn try_generate_prompt_idea(&self, recipe: &PromptRecipe) -> Result<String> {
        let token = api_key(&self.settings.chat_api_key, "chat completion")?;
        let request = ChatCompletionRequest {
            model: &self.settings.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: recipe.system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: USER_PROMPT.to_string(),
                },
            ],
            temperature: 1.0,
        };
        let body = serde_json::to_value(&request)?;
        let response = self
            .http
            .post_json(&self.settings.chat_endpoint, token, &body)?;

        let parsed: ChatCompletionResponse =
            serde_json::from_value(response).context("Unexpected chat completion response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .context("Chat completion response has no choices[0].message.content")?;

        normalize_prompt_idea(&content).context("Chat completion returned an empty prompt")
    }
}

fn api_key<'a>(key: &'a Option<String>, endpoint: &str) -> Result<&'a str> {
    key.as_deref()
        .filter(|key| !key.is_empty())
        .with_context(|| format!("No API key configured for the {} endpoint", endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::local_path;
    use crate::prompts::{AESTHETICS, CONSTRAINTS};
    use crate::test_support::{completion_response, generation_response, FakeHttp, IMAGE_BYTES};
    use serde_json::json;
    use tempfile::TempDir;

    fn settings() -> Settings {
        Settings {
            image_api_key: Some("image-key".to_string()),
            chat_api_key: Some("chat-key".to_string()),
            ..Settings::default()
        }
    }

    fn client(http: &Arc<FakeHttp>, temp_dir: &TempDir) -> GenerationClient {
        GenerationClient::new(http.clone(), settings(), temp_dir.path().to_path_buf())
    }

    #[test]
    fn test_generate_image_downloads_to_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.respond(generation_response("https://x/y.jpg"));

        let image = client(&http, &temp_dir).generate_image("neon koi").unwrap();

        assert!(image.url.starts_with("file://"));
        assert!(!image.url.starts_with("https://"));
        assert_eq!(image.prompt, "neon koi");
        assert!(image.id.parse::<i64>().is_ok());
        assert!(image.timestamp.ends_with('Z'));

        let path = local_path(&image.url).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("wallpaper_{}.jpg", image.id)
        );
        assert_eq!(fs::read(&path).unwrap(), IMAGE_BYTES);
        assert_eq!(http.downloads.lock().unwrap()[0].0, "https://x/y.jpg");
    }

    #[test]
    fn test_generate_image_request_shape() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.respond(generation_response("https://x/y.jpg"));

        client(&http, &temp_dir).generate_image("dunes").unwrap();

        let posts = http.posts.lock().unwrap();
        let (url, token, body) = &posts[0];
        assert_eq!(url, &Settings::default().image_endpoint);
        assert_eq!(token, "image-key");
        assert_eq!(
            body,
            &json!({ "model": "provider-4/imagen-4", "prompt": "dunes", "n": 1, "size": "1024x1792" })
        );
    }

    #[test]
    fn test_generate_image_missing_url_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.respond(json!({ "data": [] }));
        http.respond(json!({ "error": { "message": "quota exceeded" } }));
        http.respond(json!({ "data": [{ "b64_json": "AAAA" }] }));
        http.respond(json!("not an object"));
        let client = client(&http, &temp_dir);

        for _ in 0..4 {
            assert!(client.generate_image("dunes").is_none());
        }
        assert!(http.downloads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_generate_image_network_error_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.fail("POST returned 502 Bad Gateway");

        assert!(client(&http, &temp_dir).generate_image("dunes").is_none());
    }

    #[test]
    fn test_generate_image_failed_download_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::failing_downloads());
        http.respond(generation_response("https://x/y.jpg"));

        assert!(client(&http, &temp_dir).generate_image("dunes").is_none());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_image_without_key_skips_network() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        let client = GenerationClient::new(
            http.clone(),
            Settings::default(),
            temp_dir.path().to_path_buf(),
        );

        assert!(client.generate_image("dunes").is_none());
        assert!(client.generate_prompt_idea().is_none());
        assert_eq!(http.post_count(), 0);
    }

    #[test]
    fn test_generate_prompt_idea_trims_and_unquotes() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.respond(completion_response("  \"Obsidian waves under a violet eclipse\"\n"));

        let idea = client(&http, &temp_dir).generate_prompt_idea().unwrap();

        assert_eq!(idea, "Obsidian waves under a violet eclipse");
        assert!(!idea.starts_with('"') && !idea.ends_with('"'));
    }

    #[test]
    fn test_generate_prompt_idea_request_shape() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.respond(completion_response("Glass orchids"));

        client(&http, &temp_dir).generate_prompt_idea().unwrap();

        let body = http.last_body();
        assert_eq!(body["model"], "openai/gpt-oss-120b");
        assert_eq!(body["temperature"], 1.0);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], USER_PROMPT);

        let system = messages[0]["content"].as_str().unwrap();
        assert!(AESTHETICS.iter().any(|a| system.contains(a)));
        assert!(CONSTRAINTS.iter().any(|c| system.contains(c)));
    }

    #[test]
    fn test_generate_prompt_idea_malformed_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let http = Arc::new(FakeHttp::new());
        http.respond(json!({ "choices": [] }));
        http.respond(json!({ "choices": [{ "finish_reason": "length" }] }));
        http.respond(completion_response("   "));
        http.fail("timed out");
        let client = client(&http, &temp_dir);

        for _ in 0..4 {
            assert!(client.generate_prompt_idea().is_none());
        }
    }
}
