//! OpenAI-compatible recognition and text-generation backend.
//!
//! Recognition goes to `POST {base}/audio/transcriptions` as multipart form data. The
//! readability pass and the optional summary go to `POST {base}/chat/completions`.
//! Any server speaking those two endpoints works (OpenAI, Groq, local proxies).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{Formatter, Recognition, RecognitionMode, RecognitionRequest, Recognizer};
use crate::segments::TranscriptSegment;
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings for an OpenAI-compatible service.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL without trailing slash (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
    pub api_key: String,
    pub transcription_model: String,
    pub text_model: String,
    /// Per-request timeout. This is the only timeout applied to remote calls.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Config with default endpoint, models and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_owned(),
            text_model: DEFAULT_TEXT_MODEL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build from `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `LONGSCRIBE_TRANSCRIBE_MODEL`,
    /// `LONGSCRIBE_TEXT_MODEL` and `LONGSCRIBE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::config("OPENAI_API_KEY must be set"))?;
        let mut config = Self::new(api_key);

        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("LONGSCRIBE_TRANSCRIBE_MODEL") {
            config.transcription_model = model;
        }
        if let Ok(model) = std::env::var("LONGSCRIBE_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Ok(raw) = std::env::var("LONGSCRIBE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::config(format!("LONGSCRIBE_TIMEOUT_SECS is not a number: '{raw}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

/// HTTP client for an OpenAI-compatible service.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Summarize a finished transcript in its own language.
    pub async fn summarize(&self, transcript: &str, language: Option<&str>) -> Result<String> {
        let system = format!(
            "Summarize the following transcript in a few short paragraphs. {}",
            language_instruction(language)
        );
        self.chat(&system, transcript).await
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.text_model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .http
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Service("chat response contained no choices".into()))
    }
}

#[async_trait]
impl Recognizer for OpenAiClient {
    async fn recognize(&self, request: RecognitionRequest<'_>) -> Result<Recognition> {
        let audio_len = request.audio.len();
        let part = Part::bytes(request.audio)
            .file_name(request.file_name.to_owned())
            .mime_str(mime_for(request.file_name))?;

        let response_format = match request.mode {
            RecognitionMode::Text => "json",
            RecognitionMode::Segments => "verbose_json",
        };
        let mut form = Form::new()
            .part("file", part)
            .text("model", self.config.transcription_model.clone())
            .text("response_format", response_format);
        if request.mode == RecognitionMode::Segments {
            form = form.text("timestamp_granularities[]", "segment");
        }
        if let Some(language) = request.language {
            form = form.text("language", language.to_owned());
        }
        if let Some(prompt) = request.prompt {
            form = form.text("prompt", prompt.to_owned());
        }

        debug!(file = request.file_name, bytes = audio_len, "sending recognition request");
        let response = self
            .http
            .post(self.config.endpoint("audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        parse_transcription(&body, request.mode)
    }
}

#[async_trait]
impl Formatter for OpenAiClient {
    async fn format(&self, text: &str, language: Option<&str>) -> Result<String> {
        let system = format!(
            "You add punctuation, capitalization and paragraph breaks to raw speech \
             transcripts. Do not add, remove, translate or reword anything. Reply with the \
             formatted transcript only. {}",
            language_instruction(language)
        );
        self.chat(&system, text)
            .await
            .map_err(|err| Error::Formatting(err.to_string()))
    }
}

fn language_instruction(language: Option<&str>) -> String {
    match language {
        Some(code) => format!("The transcript language is '{code}'; answer in that language."),
        None => "Answer in the same language as the transcript.".to_owned(),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<failed to read>"));
    Err(Error::Service(format!("HTTP {status}: {}", body.trim())))
}

fn parse_transcription(body: &str, mode: RecognitionMode) -> Result<Recognition> {
    let parsed: TranscriptionResponse = serde_json::from_str(body)?;
    let segments = match mode {
        RecognitionMode::Text => Vec::new(),
        RecognitionMode::Segments => parsed
            .segments
            .ok_or_else(|| Error::Service("response did not include segments".into()))?
            .into_iter()
            .map(|s| TranscriptSegment {
                start_seconds: s.start,
                end_seconds: s.end,
                text: s.text,
            })
            .collect(),
    };
    Ok(Recognition {
        text: parsed.text,
        segments,
    })
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "m4a" | "mp4" | "aac" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    segments: Option<Vec<ResponseSegment>>,
}

#[derive(Debug, Deserialize)]
struct ResponseSegment {
    start: f64,
    end: f64,
    text: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
