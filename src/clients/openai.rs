use anyhow::anyhow;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{SpeechTranscription, TextGeneration, VisionDescription};
use crate::Result;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Prompt sent with each frame for free-text description.
const FRAME_PROMPT: &str = "Describe this video frame in detail.";

const GENERATION_MAX_TOKENS: u32 = 300;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

/// Content is a raw JSON value so the same message type covers plain text
/// and vision content parts.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: serde_json::Value,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: serde_json::Value::String(content.to_string()),
        }
    }

    fn user(content: serde_json::Value) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for the OpenAI API, covering chat generation, frame description,
/// and Whisper transcription.
pub struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    chat_model: String,
    transcription_model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, chat_model: String, transcription_model: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
            chat_model,
            transcription_model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %request.model, "OpenAI chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| anyhow!("No response from OpenAI"))
    }

    /// Guess the MIME type Whisper should see from the uploaded file name.
    fn audio_mime_type(file_name: &str) -> &'static str {
        match file_name.rsplit('.').next() {
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("ogg") => "audio/ogg",
            Some("webm") => "audio/webm",
            _ => "audio/mp4",
        }
    }
}

#[async_trait]
impl TextGeneration for OpenAiClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![
                ChatMessage::system(system),
                ChatMessage::user(serde_json::Value::String(user.to_string())),
            ],
            temperature: Some(0.7),
            max_tokens: GENERATION_MAX_TOKENS,
        };

        self.chat(&request).await
    }
}

#[async_trait]
impl VisionDescription for OpenAiClient {
    async fn describe_frame(&self, image: &[u8]) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let content = serde_json::json!([
            {"type": "text", "text": FRAME_PROMPT},
            {"type": "image_url", "image_url": {"url": format!("data:image/jpeg;base64,{}", encoded)}}
        ]);

        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![ChatMessage::user(content)],
            temperature: None,
            max_tokens: GENERATION_MAX_TOKENS,
        };

        self.chat(&request).await
    }
}

#[async_trait]
impl SpeechTranscription for OpenAiClient {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        tracing::debug!(model = %self.transcription_model, file_name, "Whisper transcription request");

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(Self::audio_mime_type(file_name))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Whisper API error ({}): {}",
                status,
                error_text
            ));
        }

        let transcription: TranscriptionResponse = response.json().await?;
        Ok(transcription.text)
    }
}
