use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ApiError;

const SUCCESS: &str = "success";

/// Body of `/add_speaker` and `/remove_speaker`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }

    pub fn into_result(self) -> Result<String, ApiError> {
        if self.is_success() {
            Ok(self.message)
        } else {
            Err(ApiError::Rejected(self.message))
        }
    }
}

/// `/get_speakers` answers with a bare list, or a status object when the
/// server failed to enumerate its speakers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SpeakersResponse {
    List(Vec<String>),
    Failure(StatusResponse),
}

impl SpeakersResponse {
    pub fn into_result(self) -> Result<Vec<String>, ApiError> {
        match self {
            Self::List(speakers) => Ok(speakers),
            Self::Failure(status) => Err(ApiError::Rejected(status.message)),
        }
    }
}

/// A reference recording uploaded as the `prompt_wav` form part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAudio {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PromptAudio {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prompt.wav".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn mime_type(&self) -> &'static str {
        let extension = Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("flac") => "audio/flac",
            Some("ogg") => "audio/ogg",
            _ => "application/octet-stream",
        }
    }
}

/// Decode a speaker mutation response. The JSON status field wins over the
/// HTTP status; a body without one on a failed request is a status error.
pub fn decode_status(status: StatusCode, body: &[u8]) -> Result<String, ApiError> {
    match serde_json::from_slice::<StatusResponse>(body) {
        Ok(response) => response.into_result(),
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}

pub fn decode_speakers(status: StatusCode, body: &[u8]) -> Result<Vec<String>, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }
    serde_json::from_slice::<SpeakersResponse>(body)?.into_result()
}

/// Request body for the OpenAI-compatible `/audio/speech` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub response_format: String,
    pub speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}
