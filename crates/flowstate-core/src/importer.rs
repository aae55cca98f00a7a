//! Bulk task import: turn pasted syllabus text into task titles.
//!
//! The core only cares about the result, an ordered list of titles that
//! [`crate::board::Board::import_tasks`] files under a goal. How the text
//! gets split is up to the [`TaskSplitter`] implementation.

use indoc::formatdoc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::ImportError;
use crate::storage::ImporterConfig;

#[allow(async_fn_in_trait)]
pub trait TaskSplitter {
    /// Split free text into ordered task titles.
    async fn split(&self, text: &str) -> Result<Vec<String>, ImportError>;
}

/// Offline splitter: one task per non-empty line, list markers removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSplitter;

impl TaskSplitter for LineSplitter {
    async fn split(&self, text: &str) -> Result<Vec<String>, ImportError> {
        Ok(split_lines(text))
    }
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let l = line.trim();
    let l = l
        .strip_prefix("- ")
        .or_else(|| l.strip_prefix("* "))
        .unwrap_or(l);
    // "1. Intro" / "12) Sensors"
    let digits = l.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &l[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }
    l.trim()
}

/// Parse a model reply that should be a JSON array of strings, tolerating
/// Markdown code fences around it.
pub fn parse_subtasks(reply: &str) -> Result<Vec<String>, ImportError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let titles: Vec<String> = serde_json::from_str(cleaned.trim())
        .map_err(|e| ImportError::Unparseable(e.to_string()))?;
    Ok(titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// Splitter backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiSplitter {
    client: Client,
    base: Url,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiSplitter {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Result<Self, ImportError> {
        Ok(Self {
            client: Client::new(),
            base: Url::parse(endpoint)?,
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build from config, reading the key from the configured env var.
    pub fn from_config(config: &ImporterConfig) -> Result<Self, ImportError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ImportError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(&config.endpoint, &config.model, &api_key)
    }

    fn prompt(text: &str) -> String {
        formatdoc! {r#"
            You are an expert academic planner.
            SYLLABUS TEXT: "{text}"
            Return ONLY a raw JSON array of strings.
        "#}
    }
}

impl TaskSplitter for GeminiSplitter {
    async fn split(&self, text: &str) -> Result<Vec<String>, ImportError> {
        let url = self
            .base
            .join(&format!("models/{}:generateContent", self.model))?;
        let body = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(text) }] }]
        });

        tracing::debug!(model = %self.model, chars = text.len(), "requesting task split");
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ImportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse = resp.json().await?;
        let text = reply
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| ImportError::Unparseable("empty model reply".into()))?;
        parse_subtasks(text)
    }
}
