use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

use super::error::ApiError;
use super::provider::SpeechBackend;
use super::types::PromptAudio;
use crate::audio::AudioData;

/// How the mock backend answers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MockBehavior {
    #[default]
    Success,
    /// Every request fails with a 503, as if the server were still loading
    Unavailable,
    /// Speaker mutations and listing answer `{"status": "error"}`
    Reject(String),
    /// Only `/get_speakers` fails with a 503; mutations still go through
    ListUnavailable,
}

/// In-memory stand-in for the inference server
pub struct MockBackend {
    speakers: Mutex<Vec<String>>,
    pcm: Vec<u8>,
    behavior: Mutex<MockBehavior>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(speakers: &[&str]) -> Self {
        Self {
            speakers: Mutex::new(speakers.iter().map(|s| s.to_string()).collect()),
            pcm: vec![0x00, 0x10, 0x00, 0xF0],
            behavior: Mutex::new(MockBehavior::Success),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pcm(mut self, pcm: Vec<u8>) -> Self {
        self.pcm = pcm;
        self
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Endpoint names in the order they were hit
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, endpoint: &str) -> MockBehavior {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.behavior.lock().unwrap().clone()
    }

    fn unavailable() -> ApiError {
        ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "model is loading".to_string(),
        }
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn synthesize(&self, _text: &str, speaker_id: &str) -> Result<AudioData, ApiError> {
        match self.record("inference_sft") {
            MockBehavior::Success | MockBehavior::ListUnavailable => {}
            MockBehavior::Unavailable => return Err(Self::unavailable()),
            MockBehavior::Reject(message) => {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: message,
                })
            }
        }

        if !self.speakers.lock().unwrap().iter().any(|s| s == speaker_id) {
            return Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: format!("unknown speaker {speaker_id}"),
            });
        }
        Ok(AudioData::new(self.pcm.clone()))
    }

    async fn add_speaker(
        &self,
        speaker_id: &str,
        _prompt: &PromptAudio,
        _prompt_text: Option<&str>,
    ) -> Result<String, ApiError> {
        match self.record("add_speaker") {
            MockBehavior::Success | MockBehavior::ListUnavailable => {}
            MockBehavior::Unavailable => return Err(Self::unavailable()),
            MockBehavior::Reject(message) => return Err(ApiError::Rejected(message)),
        }

        let mut speakers = self.speakers.lock().unwrap();
        if !speakers.iter().any(|s| s == speaker_id) {
            speakers.push(speaker_id.to_string());
        }
        Ok(format!("Speaker {speaker_id} added successfully"))
    }

    async fn remove_speaker(&self, speaker_id: &str) -> Result<String, ApiError> {
        match self.record("remove_speaker") {
            MockBehavior::Success | MockBehavior::ListUnavailable => {}
            MockBehavior::Unavailable => return Err(Self::unavailable()),
            MockBehavior::Reject(message) => return Err(ApiError::Rejected(message)),
        }

        let mut speakers = self.speakers.lock().unwrap();
        let before = speakers.len();
        speakers.retain(|s| s != speaker_id);
        if speakers.len() == before {
            return Err(ApiError::Rejected(format!("'{speaker_id}'")));
        }
        Ok(format!("Speaker {speaker_id} removed successfully"))
    }

    async fn list_speakers(&self) -> Result<Vec<String>, ApiError> {
        match self.record("get_speakers") {
            MockBehavior::Success => Ok(self.speakers.lock().unwrap().clone()),
            MockBehavior::Unavailable | MockBehavior::ListUnavailable => {
                Err(Self::unavailable())
            }
            MockBehavior::Reject(message) => Err(ApiError::Rejected(message)),
        }
    }
}
