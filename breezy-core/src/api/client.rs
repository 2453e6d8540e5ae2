//! reqwest client for the BreezyVoice inference server

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::{debug, info};

use super::error::ApiError;
use super::provider::SpeechBackend;
use super::types::{decode_speakers, decode_status, PromptAudio};
use crate::audio::AudioData;
use crate::settings::config::ServerSettings;

pub struct BreezyClient {
    base_url: String,
    client: Client,
}

impl BreezyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self::new(settings.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Clone a voice on the fly from a prompt recording and its transcript,
    /// without registering a speaker
    pub async fn synthesize_zero_shot(
        &self,
        text: &str,
        prompt_text: &str,
        prompt: &PromptAudio,
    ) -> Result<AudioData, ApiError> {
        let form = Form::new()
            .text("tts_text", text.to_string())
            .text("prompt_text", prompt_text.to_string())
            .part("prompt_wav", prompt_part(prompt)?);

        debug!(chars = text.len(), prompt = %prompt.file_name, "zero-shot synthesis");
        let response = self
            .client
            .post(self.url("/inference_zero_shot"))
            .multipart(form)
            .send()
            .await?;

        read_pcm(response).await
    }
}

#[async_trait]
impl SpeechBackend for BreezyClient {
    async fn synthesize(&self, text: &str, speaker_id: &str) -> Result<AudioData, ApiError> {
        let form = Form::new()
            .text("tts_text", text.to_string())
            .text("spk_id", speaker_id.to_string());

        debug!(chars = text.len(), speaker_id, "sft synthesis");
        let response = self
            .client
            .post(self.url("/inference_sft"))
            .multipart(form)
            .send()
            .await?;

        read_pcm(response).await
    }

    async fn add_speaker(
        &self,
        speaker_id: &str,
        prompt: &PromptAudio,
        prompt_text: Option<&str>,
    ) -> Result<String, ApiError> {
        let mut form = Form::new()
            .text("spk_id", speaker_id.to_string())
            .part("prompt_wav", prompt_part(prompt)?);
        if let Some(text) = prompt_text.filter(|text| !text.is_empty()) {
            form = form.text("prompt_text", text.to_string());
        }

        let response = self
            .client
            .post(self.url("/add_speaker"))
            .multipart(form)
            .send()
            .await?;

        let message = read_status(response).await?;
        info!(speaker_id, "speaker added");
        Ok(message)
    }

    async fn remove_speaker(&self, speaker_id: &str) -> Result<String, ApiError> {
        let form = Form::new().text("spk_id", speaker_id.to_string());

        let response = self
            .client
            .post(self.url("/remove_speaker"))
            .multipart(form)
            .send()
            .await?;

        let message = read_status(response).await?;
        info!(speaker_id, "speaker removed");
        Ok(message)
    }

    async fn list_speakers(&self) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(self.url("/get_speakers")).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let speakers = decode_speakers(status, &body)?;
        debug!(count = speakers.len(), "fetched speakers");
        Ok(speakers)
    }
}

fn prompt_part(prompt: &PromptAudio) -> Result<Part, ApiError> {
    Ok(Part::bytes(prompt.bytes.clone())
        .file_name(prompt.file_name.clone())
        .mime_str(prompt.mime_type())?)
}

async fn read_pcm(response: Response) -> Result<AudioData, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }

    let bytes = response.bytes().await?.to_vec();
    debug!(bytes = bytes.len(), "received pcm");
    Ok(AudioData::new(bytes))
}

async fn read_status(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;
    decode_status(status, &body)
}
