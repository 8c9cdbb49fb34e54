//! Minimal Gemini `generateContent` client.
//!
//! Only single-turn text prompts are needed: the answer is spoken, so no
//! streaming, tools or multi-modal parts.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::talk::Prompter;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const TIMEOUT: Duration = Duration::from_secs(60);

// ─── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn build_request(prompt: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: None,
            parts: vec![Part { text: Some(prompt.to_string()) }],
        }],
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String> {
    let resp: GenerateResponse =
        serde_json::from_str(body).context("Failed to parse Gemini response")?;

    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        bail!("Gemini blocked the prompt: {reason}");
    }
    let candidate = resp.candidates.into_iter().next().context("Gemini returned no candidates")?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!(
            "Gemini returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send `prompt` and return the model's answer text.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        info!("asking {}: {:?}", self.model, prompt);
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt))
            .send()
            .context("Gemini request failed")?;

        let status = resp.status();
        let body = resp.text().context("Failed to read Gemini response body")?;
        debug!("Gemini status {status}, body: {body}");
        if !status.is_success() {
            bail!("Gemini HTTP error {status}: {body}");
        }
        let text = extract_text(&body)?;
        info!("Gemini answered {} chars", text.chars().count());
        Ok(text)
    }
}

impl Prompter for GeminiClient {
    fn prompt(&self, prompt: &str) -> Result<String> {
        self.generate(prompt)
    }
}
