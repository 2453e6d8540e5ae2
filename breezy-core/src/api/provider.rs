use async_trait::async_trait;

use super::error::ApiError;
use super::types::PromptAudio;
use crate::audio::AudioData;

/// The operations the console needs from a speech server
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize `text` with a registered speaker, returning raw PCM
    async fn synthesize(&self, text: &str, speaker_id: &str) -> Result<AudioData, ApiError>;

    /// Register a new speaker from a reference recording. Without a
    /// transcript the server transcribes the recording itself.
    async fn add_speaker(
        &self,
        speaker_id: &str,
        prompt: &PromptAudio,
        prompt_text: Option<&str>,
    ) -> Result<String, ApiError>;

    async fn remove_speaker(&self, speaker_id: &str) -> Result<String, ApiError>;

    async fn list_speakers(&self) -> Result<Vec<String>, ApiError>;
}
