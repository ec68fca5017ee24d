use crate::session::Job;
use crate::settings::Settings;
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const PNG_MIME: &str = "image/png";
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub instruction: String,
    /// Required output schema; the reply must be JSON conforming to it.
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingRequest {
    pub instruction: String,
    pub png: Vec<u8>,
}

/// The hosted model. Calls block, so callers run them off the UI thread.
pub trait AiGateway: Send + Sync {
    fn generate_job(&self, request: &JobRequest) -> Result<Job>;
    fn describe_drawing(&self, request: &DrawingRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn job_body(request: &JobRequest) -> Result<Value> {
    let body = GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part::Text(&request.instruction)],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.schema,
        }),
    };
    Ok(serde_json::to_value(body)?)
}

fn drawing_body(request: &DrawingRequest) -> Result<Value> {
    let body = GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData(InlineData {
                    mime_type: PNG_MIME,
                    data: general_purpose::STANDARD.encode(&request.png),
                }),
                Part::Text(&request.instruction),
            ],
        }],
        generation_config: None,
    };
    Ok(serde_json::to_value(body)?)
}

fn response_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        bail!("request blocked: {reason}");
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("response has no candidates"))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!(
            "response has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

/// Parses the structured job reply. Both fields must be present and
/// non-blank.
pub fn parse_job(text: &str) -> Result<Job> {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    let job: Job = serde_json::from_str(json.trim()).context("job reply is not valid job json")?;
    if job.title.trim().is_empty() || job.description.trim().is_empty() {
        bail!("job reply has an empty title or description");
    }
    Ok(Job {
        title: job.title.trim().to_string(),
        description: job.description.trim().to_string(),
    })
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct GeminiGateway {
    client: Client,
    api_base: String,
    model: String,
    api_key_env: String,
}

impl GeminiGateway {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .user_agent("job-doodle")
            .build()?;
        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key_env: settings.api_key_env.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Read on every call so a key exported after startup is picked up.
    fn api_key(&self) -> Result<String> {
        let key = std::env::var(&self.api_key_env)
            .with_context(|| format!("environment variable {} is not set", self.api_key_env))?;
        let key = key.trim();
        if key.is_empty() {
            bail!("environment variable {} is empty", self.api_key_env);
        }
        Ok(key.to_string())
    }

    fn generate(&self, body: &Value) -> Result<String> {
        let key = self.api_key()?;
        let url = self.endpoint();
        tracing::debug!(%url, "sending generateContent request");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key)
            .json(body)
            .send()
            .context("send generateContent request")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("model returned {status}: {}", truncate(&body, ERROR_BODY_LIMIT));
        }
        let parsed: GenerateContentResponse =
            response.json().context("decode generateContent response")?;
        response_text(parsed)
    }
}

impl AiGateway for GeminiGateway {
    fn generate_job(&self, request: &JobRequest) -> Result<Job> {
        let text = self.generate(&job_body(request)?)?;
        parse_job(&text)
    }

    fn describe_drawing(&self, request: &DrawingRequest) -> Result<String> {
        let text = self.generate(&drawing_body(request)?)?;
        Ok(text.trim().to_string())
    }
}
